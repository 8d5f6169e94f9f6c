//! marketdesk-resilience
//!
//! The three leaf components the desk orchestrator is built on:
//!
//! - [`cache::TtlCache`]: expiring key/value store with capacity-bounded
//!   lazy eviction and a `cached()` read-through helper.
//! - [`breaker::BreakerRegistry`]: per-provider failure counter and
//!   open/closed gate.
//! - [`session::SessionClock`]: trading-session calendar used to pick
//!   session-aware TTLs.
//!
//! All three are plain in-process state guarded by mutexes; none of them
//! can fail, and none persist across restarts.
#![warn(missing_docs)]

/// Per-provider circuit breaker registry.
pub mod breaker;
/// Expiring key/value store.
pub mod cache;
/// Trading-session clock.
pub mod session;

pub use breaker::BreakerRegistry;
pub use cache::TtlCache;
pub use session::SessionClock;
