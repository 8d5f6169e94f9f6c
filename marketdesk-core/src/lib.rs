//! marketdesk-core
//!
//! Domain types, provider traits, and configuration shared across the
//! marketdesk workspace.
//!
//! - `types`: result shapes returned to the application (quotes, bars,
//!   news, search hits, macro observations).
//! - `provider`: the `MarketProvider` umbrella trait and focused role
//!   traits implemented by upstream adapters.
//! - `config`: TTL, cache, breaker, and session policies consumed by the
//!   orchestrator.
//!
//! Every provider role trait is async (Tokio is the assumed runtime) and
//! returns `Result<_, DeskError>`; the orchestrator in `marketdesk` is the
//! only place those errors are absorbed into absent values.
#![warn(missing_docs)]

/// Capability labels used for routing, errors, and telemetry.
pub mod capability;
/// Policy structs for TTLs, cache sizing, the breaker, and the session clock.
pub mod config;
/// The unified `DeskError` type.
pub mod error;
/// The `MarketProvider` trait and its role traits.
pub mod provider;
/// Result shapes served by the data-access layer.
pub mod types;

pub use capability::Capability;
pub use config::{BreakerPolicy, CachePolicy, DeskConfig, SessionPolicy, TtlPolicy};
pub use error::DeskError;
pub use provider::{
    HistorySource, MarketProvider, NewsSource, ProfileSource, QuoteDetailSource,
    QuoteSnapshotSource, SearchSource, SeriesSource,
};
pub use types::*;
