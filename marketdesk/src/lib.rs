//! marketdesk turns several flaky, rate-limited market-data providers into
//! one bounded-latency, always-responding internal API.
//!
//! Overview
//! - Routes each operation (quote, history, news, search, macro series,
//!   profile) across registered providers in a configurable priority order.
//! - Gates every attempt on a per-provider circuit breaker so an unhealthy
//!   provider is skipped for a cool-down window instead of hammered.
//! - Races the fast primary quote against a slower descriptive enrichment
//!   under a short timeout; the enrichment never delays the price.
//! - Caches every result with an operation-appropriate TTL, extended to a
//!   freeze TTL while the exchange session is closed.
//! - Absorbs all provider failures: public operations return `Option`,
//!   `Vec`, or a map of successes, never an error.
//!
//! Building a desk:
//! ```rust,ignore
//! use std::sync::Arc;
//! use marketdesk::{Capability, Desk};
//! use marketdesk_http::{Finnhub, Fmp, Fred, TwelveData};
//!
//! let finnhub = Arc::new(Finnhub::from_env()?);
//! let fmp = Arc::new(Fmp::from_env()?);
//! let twelve = Arc::new(TwelveData::from_env()?);
//! let fred = Arc::new(Fred::from_env()?);
//!
//! let desk = Desk::builder()
//!     .with_provider(finnhub.clone())
//!     .with_provider(fmp.clone())
//!     .with_provider(twelve.clone())
//!     .with_provider(fred)
//!     .prefer_for(Capability::History, &[twelve, fmp.clone(), finnhub])
//!     .build()?;
//!
//! let quote = desk.quote("AAPL").await; // Option<Quote>
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod router;

pub use crate::core::{Desk, DeskBuilder};
pub use crate::router::series::KEY_MACRO_SERIES;

pub use marketdesk_core::{
    Capability,
    CompanyProfile,
    DeskConfig,
    DeskError,
    // Provider contracts
    HistorySource,
    MarketProvider,
    NewsArticle,
    NewsSource,
    Observation,
    OhlcvBar,
    ProfileSource,
    // Result types
    Quote,
    QuoteDetail,
    QuoteDetailSource,
    QuoteSnapshot,
    QuoteSnapshotSource,
    SearchResult,
    SearchSource,
    SeriesInfo,
    SeriesQuery,
    SeriesSource,
    SortOrder,
    normalize_symbol,
};
pub use marketdesk_resilience::{BreakerRegistry, SessionClock, TtlCache};
