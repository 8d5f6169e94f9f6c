use std::time::Duration;

use chrono::{NaiveDate, Utc};
use marketdesk_core::types::{OhlcvBar, normalize_symbol};
use marketdesk_core::{Capability, DeskError};
use tracing::warn;

use crate::core::Desk;

impl Desk {
    /// Fetch daily OHLCV bars for a symbol over an optional date range,
    /// oldest bar first.
    ///
    /// Ranges ending strictly before today are immutable and cached with the
    /// long past-history TTL; anything touching today's still-forming bar
    /// uses the short live TTL. An empty result from a healthy provider
    /// falls through to the next one; empty is returned (and cached) only
    /// when the whole chain comes back empty or failed.
    pub async fn history(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<OhlcvBar> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Vec::new();
        }
        let key = format!(
            "history:{symbol}:{}:{}",
            from.map(|d| d.to_string()).unwrap_or_default(),
            to.map(|d| d.to_string()).unwrap_or_default(),
        );
        self.stores
            .bars
            .cached(&key, self.history_ttl(to), || self.bars_uncached(&symbol, from, to))
            .await
            .inspect_err(|e| warn!(symbol = %symbol, error = %e, "history unavailable"))
            .unwrap_or_default()
    }

    fn history_ttl(&self, to: Option<NaiveDate>) -> Duration {
        match to {
            Some(end) if end < Utc::now().date_naive() => self.cfg.ttl.history_past,
            _ => self.cfg.ttl.history_live,
        }
    }

    async fn bars_uncached(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, DeskError> {
        self.attempt_non_empty(Capability::History, |p| {
            p.as_history_source()?;
            let sym = symbol.to_string();
            Some(async move {
                match p.as_history_source() {
                    Some(src) => src.daily_bars(&sym, from, to).await,
                    None => Err(DeskError::unsupported(Capability::History.as_str())),
                }
            })
        })
        .await
    }
}
