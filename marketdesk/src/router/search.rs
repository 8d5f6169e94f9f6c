use marketdesk_core::types::SearchResult;
use marketdesk_core::{Capability, DeskError};
use tracing::warn;

use crate::core::Desk;

impl Desk {
    /// Free-text symbol search, capped at the configured result limit.
    ///
    /// The cache key is the case-folded query, so "apple" and "Apple"
    /// collapse onto one entry. Empty on a blank query or total provider
    /// failure.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let key = format!("search:{}", query.to_lowercase());
        self.stores
            .search
            .cached(&key, self.cfg.ttl.search, || self.search_uncached(query))
            .await
            .inspect_err(|e| warn!(query, error = %e, "search unavailable"))
            .unwrap_or_default()
    }

    async fn search_uncached(&self, query: &str) -> Result<Vec<SearchResult>, DeskError> {
        let limit = self.cfg.search_limit;
        let mut hits = self
            .attempt(Capability::Search, |p| {
                p.as_search_source()?;
                let q = query.to_string();
                Some(async move {
                    match p.as_search_source() {
                        Some(src) => src.search(&q, limit).await,
                        None => Err(DeskError::unsupported(Capability::Search.as_str())),
                    }
                })
            })
            .await?;
        hits.truncate(limit);
        Ok(hits)
    }
}
