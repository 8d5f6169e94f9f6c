use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use marketdesk_core::types::{Quote, QuoteDetail, normalize_symbol};
use marketdesk_core::{Capability, DeskError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::{Desk, run_chain};

/// Index-class symbols carry a caret prefix (e.g. `^GSPC`).
fn is_index_symbol(symbol: &str) -> bool {
    symbol.starts_with('^')
}

impl Desk {
    /// Fetch a quote for one symbol.
    ///
    /// Cache-through with the quote TTL. On a miss the primary snapshot
    /// chain runs first; a valid snapshot is then enriched with descriptive
    /// fields raced against the enrichment timeout, and a failed snapshot
    /// falls through to the detail chain for a full quote. Absence is a
    /// legitimate outcome, not an error.
    pub async fn quote(&self, symbol: &str) -> Option<Quote> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return None;
        }
        let key = format!("quote:{symbol}");
        self.stores
            .quotes
            .cached(&key, self.cfg.ttl.quote, || self.quote_uncached(&symbol))
            .await
            .inspect_err(|e| warn!(symbol = %symbol, error = %e, "quote unavailable"))
            .ok()
    }

    /// Fetch quotes for several symbols concurrently.
    ///
    /// Partial results are the expected outcome: symbols whose fetch failed
    /// are simply absent from the map.
    pub async fn quotes(&self, symbols: &[&str]) -> HashMap<String, Quote> {
        let tasks = symbols.iter().map(|s| {
            let symbol = normalize_symbol(s);
            async move {
                let quote = self.quote(&symbol).await;
                (symbol, quote)
            }
        });

        let mut out = HashMap::new();
        for (symbol, quote) in futures::future::join_all(tasks).await {
            if let Some(q) = quote {
                out.insert(symbol, q);
            }
        }
        out
    }

    async fn quote_uncached(&self, symbol: &str) -> Result<Quote, DeskError> {
        let index = is_index_symbol(symbol);
        let snapshot = self
            .attempt(Capability::Quote, |p| {
                if index && !p.serves_index_symbols() {
                    return None;
                }
                p.as_quote_snapshot_source()?;
                let sym = symbol.to_string();
                Some(async move {
                    match p.as_quote_snapshot_source() {
                        Some(src) => src.quote_snapshot(&sym).await,
                        None => Err(DeskError::unsupported(Capability::Quote.as_str())),
                    }
                })
            })
            .await;

        match snapshot {
            // Some sources report an unknown symbol as an all-zero payload;
            // a snapshot without a real price falls through like a failure.
            Ok(snap) if snap.has_valid_price() => {
                // The enrichment chain runs as a detached task so a loss in
                // the race still records its eventual outcome against the
                // providers' breakers. Its late result is discarded.
                let race = tokio::time::timeout(self.cfg.enrich_timeout, self.spawn_enrichment(symbol));
                let enrichment = match race.await {
                    Ok(Ok(detail)) => detail,
                    Ok(Err(_)) | Err(_) => None,
                };
                Ok(Quote::from_snapshot(symbol, &snap, enrichment.as_ref(), Utc::now()))
            }
            Ok(_) | Err(_) => {
                let detail = self.quote_detail_chain(symbol).await?;
                Ok(Quote::from_detail(symbol, &detail, Utc::now()))
            }
        }
    }

    fn spawn_enrichment(&self, symbol: &str) -> JoinHandle<Option<QuoteDetail>> {
        let providers = self.ordered_for(Capability::QuoteEnrichment);
        let breakers = Arc::clone(&self.breakers);
        let timeout = self.cfg.provider_timeout;
        let symbol = symbol.to_string();
        tokio::spawn(async move {
            let out = run_chain(
                providers,
                breakers,
                Capability::QuoteEnrichment,
                timeout,
                |p| {
                    p.as_quote_detail_source()?;
                    let sym = symbol.clone();
                    Some(async move {
                        match p.as_quote_detail_source() {
                            Some(src) => src.quote_detail(&sym).await,
                            None => {
                                Err(DeskError::unsupported(Capability::QuoteEnrichment.as_str()))
                            }
                        }
                    })
                },
            )
            .await;
            match out {
                Ok(detail) => Some(detail),
                Err(e) => {
                    debug!(symbol = %symbol, error = %e, "quote enrichment unavailable");
                    None
                }
            }
        })
    }

    async fn quote_detail_chain(&self, symbol: &str) -> Result<QuoteDetail, DeskError> {
        self.attempt(Capability::QuoteEnrichment, |p| {
            p.as_quote_detail_source()?;
            let sym = symbol.to_string();
            Some(async move {
                match p.as_quote_detail_source() {
                    Some(src) => src.quote_detail(&sym).await,
                    None => Err(DeskError::unsupported(Capability::QuoteEnrichment.as_str())),
                }
            })
        })
        .await
    }
}
