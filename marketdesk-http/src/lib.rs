//! HTTP provider adapters for `marketdesk`.
//!
//! Each adapter implements [`marketdesk_core::MarketProvider`] plus the role
//! traits its upstream API can serve:
//!
//! | Adapter | Roles |
//! |---|---|
//! | [`Finnhub`] | quote snapshot, search, news, history |
//! | [`Fmp`] | quote detail, profile, history, news |
//! | [`TwelveData`] | history |
//! | [`Fred`] | macro series |
//!
//! Adapters are pure transport: retries and per-request timeouts live here,
//! while caching, circuit breaking, and fallback ordering are the
//! orchestrator's job. Keys load from the environment via the `from_env`
//! constructors (`FINNHUB_API_KEY`, `FMP_API_KEY`, `TWELVE_DATA_API_KEY`,
//! `FRED_API_KEY`).

#![warn(missing_docs)]

mod client;

pub mod finnhub;
pub mod fmp;
pub mod fred;
pub mod twelvedata;

pub use finnhub::Finnhub;
pub use fmp::Fmp;
pub use fred::Fred;
pub use twelvedata::TwelveData;
