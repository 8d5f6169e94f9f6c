//! Per-provider circuit breaker.
//!
//! Each provider gets an independent failure counter. Reaching the failure
//! threshold opens the circuit for a fixed window; while open, the
//! orchestrator skips the provider entirely. Once the window lapses the
//! provider's state is discarded on the next gate check, so the next attempt
//! runs against a clean slate. A single success closes the circuit and
//! clears the counter.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use marketdesk_core::config::BreakerPolicy;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy)]
struct BreakerState {
    failures: u32,
    open_until: Option<Instant>,
}

/// Failure bookkeeping for every gated provider, keyed by provider name.
pub struct BreakerRegistry {
    inner: Mutex<HashMap<&'static str, BreakerState>>,
    policy: BreakerPolicy,
}

impl BreakerRegistry {
    /// Create a registry with the given trip threshold and open window.
    #[must_use]
    pub fn new(policy: BreakerPolicy) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// Whether the provider's circuit is currently open.
    ///
    /// An open window that has lapsed is cleared here, failure count
    /// included, so the provider re-enters rotation with a clean slate.
    pub fn is_open(&self, provider: &'static str) -> bool {
        self.is_open_at(Instant::now(), provider)
    }

    fn is_open_at(&self, now: Instant, provider: &'static str) -> bool {
        let mut guard = self.inner.lock().expect("mutex poisoned");
        let Some(state) = guard.get(provider) else {
            return false;
        };
        match state.open_until {
            Some(until) if now < until => true,
            Some(_) => {
                guard.remove(provider);
                info!(provider, "circuit re-entering rotation after open window");
                false
            }
            None => false,
        }
    }

    /// Record a successful call. Closes the circuit and clears the counter.
    pub fn record_success(&self, provider: &'static str) {
        let mut guard = self.inner.lock().expect("mutex poisoned");
        guard.remove(provider);
    }

    /// Record a failed call. The counter always advances, but an already
    /// open circuit keeps its original deadline; late failures from calls
    /// issued before the trip must not push the re-entry point out.
    pub fn record_failure(&self, provider: &'static str) {
        self.record_failure_at(Instant::now(), provider);
    }

    fn record_failure_at(&self, now: Instant, provider: &'static str) {
        let mut guard = self.inner.lock().expect("mutex poisoned");
        let state = guard.entry(provider).or_default();
        state.failures = state.failures.saturating_add(1);
        let currently_open = state.open_until.is_some_and(|until| now < until);
        if !currently_open && state.failures >= self.policy.threshold {
            state.open_until = Some(now + self.policy.open_for);
            warn!(
                provider,
                failures = state.failures,
                open_for_secs = self.policy.open_for.as_secs(),
                "circuit opened"
            );
        }
    }

    /// Consecutive failures recorded for the provider.
    #[must_use]
    pub fn failures(&self, provider: &str) -> u32 {
        self.inner
            .lock()
            .expect("mutex poisoned")
            .get(provider)
            .map_or(0, |state| state.failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn registry() -> BreakerRegistry {
        BreakerRegistry::new(BreakerPolicy::default())
    }

    #[test]
    fn stays_closed_below_threshold() {
        let reg = registry();
        let t0 = Instant::now();
        reg.record_failure_at(t0, "fmp");
        reg.record_failure_at(t0, "fmp");
        assert!(!reg.is_open_at(t0, "fmp"));
        assert_eq!(reg.failures("fmp"), 2);
    }

    #[test]
    fn opens_at_threshold_for_the_configured_window() {
        let reg = registry();
        let t0 = Instant::now();
        for _ in 0..3 {
            reg.record_failure_at(t0, "fmp");
        }
        assert!(reg.is_open_at(t0, "fmp"));
        assert!(reg.is_open_at(t0 + Duration::from_secs(299), "fmp"));
        // The deadline itself re-admits the provider.
        assert!(!reg.is_open_at(t0 + Duration::from_secs(300), "fmp"));
    }

    #[test]
    fn success_closes_and_clears_the_counter() {
        let reg = registry();
        let t0 = Instant::now();
        for _ in 0..3 {
            reg.record_failure_at(t0, "fmp");
        }
        reg.record_success("fmp");
        assert!(!reg.is_open_at(t0, "fmp"));
        assert_eq!(reg.failures("fmp"), 0);
        // Re-tripping takes a full fresh run of failures.
        reg.record_failure_at(t0, "fmp");
        assert!(!reg.is_open_at(t0, "fmp"));
    }

    #[test]
    fn failures_while_open_do_not_extend_the_deadline() {
        let reg = registry();
        let t0 = Instant::now();
        for _ in 0..3 {
            reg.record_failure_at(t0, "fmp");
        }
        // A straggler call that was in flight before the trip reports late.
        reg.record_failure_at(t0 + Duration::from_secs(100), "fmp");
        assert_eq!(reg.failures("fmp"), 4);
        assert!(reg.is_open_at(t0 + Duration::from_secs(299), "fmp"));
        assert!(!reg.is_open_at(t0 + Duration::from_secs(300), "fmp"));
    }

    #[test]
    fn lapsed_window_resets_state_on_the_gate_check() {
        let reg = registry();
        let t0 = Instant::now();
        for _ in 0..3 {
            reg.record_failure_at(t0, "fmp");
        }
        let after = t0 + Duration::from_secs(300);
        assert!(!reg.is_open_at(after, "fmp"));
        assert_eq!(reg.failures("fmp"), 0);
        // One probe failure after re-entry does not re-open the circuit.
        reg.record_failure_at(after, "fmp");
        assert!(!reg.is_open_at(after, "fmp"));
    }

    #[test]
    fn providers_are_tracked_independently() {
        let reg = registry();
        let t0 = Instant::now();
        for _ in 0..3 {
            reg.record_failure_at(t0, "fmp");
        }
        assert!(reg.is_open_at(t0, "fmp"));
        assert!(!reg.is_open_at(t0, "finnhub"));
        assert_eq!(reg.failures("finnhub"), 0);
    }
}
