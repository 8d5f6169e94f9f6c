//! Provider role traits and the `MarketProvider` umbrella interface.
//!
//! Each upstream data source implements `MarketProvider` plus whichever role
//! traits it can serve; the orchestrator discovers capabilities through the
//! `as_*` accessors and never learns provider URLs or authentication.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::DeskError;
use crate::types::{
    CompanyProfile, NewsArticle, Observation, OhlcvBar, QuoteDetail, QuoteSnapshot, SearchResult,
    SeriesInfo, SeriesQuery,
};

/// Focused role trait for sources serving a fast price snapshot.
#[async_trait]
pub trait QuoteSnapshotSource: Send + Sync {
    /// Fetch the current price snapshot for a symbol.
    async fn quote_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot, DeskError>;
}

/// Focused role trait for sources serving a full descriptive quote.
#[async_trait]
pub trait QuoteDetailSource: Send + Sync {
    /// Fetch the descriptive quote for a symbol.
    async fn quote_detail(&self, symbol: &str) -> Result<QuoteDetail, DeskError>;
}

/// Focused role trait for sources serving daily OHLCV history.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch daily bars for a symbol over an optional date range, oldest
    /// bar first.
    async fn daily_bars(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, DeskError>;
}

/// Focused role trait for sources serving company news.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch recent articles for a symbol, newest first, at most `limit`.
    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, DeskError>;
}

/// Focused role trait for sources serving free-text symbol search.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Search instruments matching `query`, at most `limit` results.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, DeskError>;
}

/// Focused role trait for sources serving macroeconomic series.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Fetch observations for a series.
    async fn observations(
        &self,
        series_id: &str,
        query: &SeriesQuery,
    ) -> Result<Vec<Observation>, DeskError>;

    /// Fetch metadata for a series.
    async fn series_info(&self, series_id: &str) -> Result<SeriesInfo, DeskError>;
}

/// Focused role trait for sources serving company reference profiles.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the company profile for a symbol.
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile, DeskError>;
}

/// Primary interface implemented by every upstream provider adapter.
///
/// All `as_*` accessors default to `None`; an adapter overrides the ones it
/// can serve. The orchestrator tries providers in priority order and skips
/// any that do not expose the needed role.
pub trait MarketProvider: Send + Sync {
    /// Stable provider name used as the breaker identity and in logs.
    fn name(&self) -> &'static str;

    /// Whether calls to this provider pass through the circuit breaker.
    ///
    /// Cheap, free-tier primaries opt out: they are always worth one attempt
    /// and their failures should not suppress future attempts.
    fn breaker_gated(&self) -> bool {
        true
    }

    /// Whether this provider can serve index-class symbols (e.g. `^GSPC`).
    fn serves_index_symbols(&self) -> bool {
        true
    }

    /// Access the quote snapshot role, when served.
    fn as_quote_snapshot_source(&self) -> Option<&dyn QuoteSnapshotSource> {
        None
    }
    /// Access the quote detail role, when served.
    fn as_quote_detail_source(&self) -> Option<&dyn QuoteDetailSource> {
        None
    }
    /// Access the history role, when served.
    fn as_history_source(&self) -> Option<&dyn HistorySource> {
        None
    }
    /// Access the news role, when served.
    fn as_news_source(&self) -> Option<&dyn NewsSource> {
        None
    }
    /// Access the search role, when served.
    fn as_search_source(&self) -> Option<&dyn SearchSource> {
        None
    }
    /// Access the macro series role, when served.
    fn as_series_source(&self) -> Option<&dyn SeriesSource> {
        None
    }
    /// Access the profile role, when served.
    fn as_profile_source(&self) -> Option<&dyn ProfileSource> {
        None
    }
}
