//! Configuration types consumed by the desk orchestrator and the
//! resilience components.

use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Per-operation time-to-live policy.
///
/// Real-time data gets short TTLs; anything immutable (past OHLCV bars,
/// reference profiles, monthly macro series) is held much longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlPolicy {
    /// Real-time quotes.
    pub quote: Duration,
    /// User-driven symbol search.
    pub search: Duration,
    /// Company news.
    pub news: Duration,
    /// History ranges that include today's still-forming bar.
    pub history_live: Duration,
    /// History ranges ending strictly before today (immutable).
    pub history_past: Duration,
    /// Company reference profiles.
    pub profile: Duration,
    /// Macro series observations.
    pub macro_series: Duration,
    /// Macro series metadata.
    pub macro_meta: Duration,
    /// Minimum TTL for dashboard-level aggregates while the session is open;
    /// off-hours requests switch to the session freeze TTL instead.
    pub dashboard_min: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            quote: Duration::from_secs(60),
            search: Duration::from_secs(120),
            news: Duration::from_secs(900),
            history_live: Duration::from_secs(300),
            history_past: Duration::from_secs(86_400),
            profile: Duration::from_secs(7 * 86_400),
            macro_series: Duration::from_secs(86_400),
            macro_meta: Duration::from_secs(7 * 86_400),
            dashboard_min: Duration::from_secs(120),
        }
    }
}

/// Capacity bounds for one cache store.
///
/// A write that pushes the entry count above `high_water` triggers a
/// two-phase cleanup: expired entries are purged first, and if the store is
/// still above `low_water` the soonest-expiring entries are evicted until it
/// is back at `low_water`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Entry count that triggers cleanup on the write path.
    pub high_water: usize,
    /// Entry count the eviction pass reduces the store to.
    pub low_water: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            high_water: 2000,
            low_water: 1500,
        }
    }
}

/// Circuit breaker tuning, shared by all gated providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerPolicy {
    /// Consecutive failures required to open the circuit.
    pub threshold: u32,
    /// How long an opened circuit stays open.
    pub open_for: Duration,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            threshold: 3,
            open_for: Duration::from_secs(300),
        }
    }
}

/// Trading-session definition for the primary exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    /// Exchange timezone.
    pub timezone: Tz,
    /// Session open as minute-of-day in local time (inclusive).
    pub open_minute: u32,
    /// Session close as minute-of-day in local time (exclusive).
    pub close_minute: u32,
    /// Added on top of the time-until-next-open when computing the
    /// off-hours freeze TTL, so a cached snapshot outlives the exact open
    /// boundary.
    pub safety_buffer: Duration,
}

impl Default for SessionPolicy {
    /// US equities regular session: 09:30–16:00 America/New_York.
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            open_minute: 9 * 60 + 30,
            close_minute: 16 * 60,
            safety_buffer: Duration::from_secs(30),
        }
    }
}

/// Global configuration for the `Desk` orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Per-operation TTLs.
    pub ttl: TtlPolicy,
    /// Capacity bounds applied to every cache store.
    pub cache: CachePolicy,
    /// Circuit breaker tuning.
    pub breaker: BreakerPolicy,
    /// Trading-session definition used for session-aware TTLs.
    pub session: SessionPolicy,
    /// How long the primary quote waits for enrichment before returning
    /// without it. The enrichment attempt keeps running in the background;
    /// its late result is discarded.
    pub enrich_timeout: Duration,
    /// Per-attempt timeout applied to every provider call.
    pub provider_timeout: Duration,
    /// Maximum articles returned by the news operation.
    pub news_limit: usize,
    /// Maximum hits returned by the search operation.
    pub search_limit: usize,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            ttl: TtlPolicy::default(),
            cache: CachePolicy::default(),
            breaker: BreakerPolicy::default(),
            session: SessionPolicy::default(),
            enrich_timeout: Duration::from_millis(1500),
            provider_timeout: Duration::from_secs(5),
            news_limit: 15,
            search_limit: 10,
        }
    }
}
