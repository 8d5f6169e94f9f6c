use marketdesk_core::types::{NewsArticle, normalize_symbol};
use marketdesk_core::{Capability, DeskError};
use tracing::warn;

use crate::core::Desk;

impl Desk {
    /// Fetch recent news for a symbol, newest first, capped at the
    /// configured article limit. A source with no articles falls through to
    /// the next one; empty means the whole chain had nothing.
    pub async fn news(&self, symbol: &str) -> Vec<NewsArticle> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Vec::new();
        }
        let key = format!("news:{symbol}");
        self.stores
            .news
            .cached(&key, self.cfg.ttl.news, || self.news_uncached(&symbol))
            .await
            .inspect_err(|e| warn!(symbol = %symbol, error = %e, "news unavailable"))
            .unwrap_or_default()
    }

    async fn news_uncached(&self, symbol: &str) -> Result<Vec<NewsArticle>, DeskError> {
        let limit = self.cfg.news_limit;
        let mut articles = self
            .attempt_non_empty(Capability::News, |p| {
                p.as_news_source()?;
                let sym = symbol.to_string();
                Some(async move {
                    match p.as_news_source() {
                        Some(src) => src.news(&sym, limit).await,
                        None => Err(DeskError::unsupported(Capability::News.as_str())),
                    }
                })
            })
            .await?;
        articles.truncate(limit);
        Ok(articles)
    }
}
