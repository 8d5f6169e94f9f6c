use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use marketdesk_core::config::DeskConfig;
use marketdesk_core::types::{
    CompanyProfile, NewsArticle, Observation, OhlcvBar, Quote, SearchResult, SeriesInfo,
};
use marketdesk_core::{Capability, DeskError, MarketProvider};
use marketdesk_resilience::{BreakerRegistry, SessionClock, TtlCache};
use tracing::{debug, warn};

/// One typed cache store per operation family, all bounded by the same
/// capacity policy. Keeping them separate means a burst of search traffic
/// can never evict quotes.
pub(crate) struct Stores {
    pub(crate) quotes: TtlCache<Quote>,
    pub(crate) bars: TtlCache<Vec<OhlcvBar>>,
    pub(crate) news: TtlCache<Vec<NewsArticle>>,
    pub(crate) search: TtlCache<Vec<SearchResult>>,
    pub(crate) profiles: TtlCache<CompanyProfile>,
    pub(crate) series: TtlCache<Vec<Observation>>,
    pub(crate) series_info: TtlCache<SeriesInfo>,
}

impl Stores {
    fn new(cfg: &DeskConfig) -> Self {
        Self {
            quotes: TtlCache::new(cfg.cache),
            bars: TtlCache::new(cfg.cache),
            news: TtlCache::new(cfg.cache),
            search: TtlCache::new(cfg.cache),
            profiles: TtlCache::new(cfg.cache),
            series: TtlCache::new(cfg.cache),
            series_info: TtlCache::new(cfg.cache),
        }
    }
}

/// Orchestrator that routes data requests across registered providers.
///
/// Every public operation is cache-through and error-absorbing: a cache hit
/// returns immediately; on a miss the provider chain for the capability is
/// tried in priority order under circuit-breaker gating, and exhaustion
/// yields an absent value (`None` or an empty collection), never an error.
pub struct Desk {
    pub(crate) providers: Vec<Arc<dyn MarketProvider>>,
    pub(crate) cfg: DeskConfig,
    pub(crate) priority: HashMap<Capability, Vec<&'static str>>,
    pub(crate) stores: Stores,
    pub(crate) breakers: Arc<BreakerRegistry>,
    pub(crate) clock: SessionClock,
}

/// Builder for a [`Desk`] with custom providers, priorities, and policies.
pub struct DeskBuilder {
    providers: Vec<Arc<dyn MarketProvider>>,
    cfg: DeskConfig,
    priority: HashMap<Capability, Vec<&'static str>>,
}

impl Default for DeskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeskBuilder {
    /// Create a builder with default policies and no providers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: vec![],
            cfg: DeskConfig::default(),
            priority: HashMap::new(),
        }
    }

    /// Register a provider. Registration order is the fallback order for
    /// capabilities without an explicit [`prefer_for`](Self::prefer_for).
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn MarketProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Set the provider ordering for one capability.
    ///
    /// Listed providers come first, in the given order; unlisted but capable
    /// providers remain eligible after them in registration order.
    #[must_use]
    pub fn prefer_for(
        mut self,
        capability: Capability,
        providers_desc: &[Arc<dyn MarketProvider>],
    ) -> Self {
        let names: Vec<&'static str> = providers_desc.iter().map(|p| p.name()).collect();
        self.priority.insert(capability, names);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: DeskConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Override the per-attempt provider timeout.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Override how long a quote waits for enrichment before returning
    /// without it.
    #[must_use]
    pub const fn enrich_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.enrich_timeout = timeout;
        self
    }

    /// Build the desk.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no providers have been registered.
    pub fn build(mut self) -> Result<Desk, DeskError> {
        if self.providers.is_empty() {
            return Err(DeskError::InvalidArg(
                "no providers registered; add at least one via with_provider(...)".to_string(),
            ));
        }

        // Drop priority entries naming unregistered providers and dedup.
        let known: std::collections::HashSet<&'static str> =
            self.providers.iter().map(|p| p.name()).collect();
        for names in self.priority.values_mut() {
            let mut seen: std::collections::HashSet<&'static str> =
                std::collections::HashSet::new();
            names.retain(|n| known.contains(n) && seen.insert(n));
        }

        Ok(Desk {
            stores: Stores::new(&self.cfg),
            breakers: Arc::new(BreakerRegistry::new(self.cfg.breaker)),
            clock: SessionClock::new(self.cfg.session),
            providers: self.providers,
            cfg: self.cfg,
            priority: self.priority,
        })
    }
}

/// Run one provider future under the per-attempt timeout.
pub(crate) async fn provider_call_with_timeout<T, Fut>(
    provider: &'static str,
    capability: Capability,
    timeout: Duration,
    fut: Fut,
) -> Result<T, DeskError>
where
    Fut: Future<Output = Result<T, DeskError>>,
{
    (tokio::time::timeout(timeout, fut).await)
        .unwrap_or_else(|_| Err(DeskError::provider_timeout(provider, capability.as_str())))
}

/// Walk a provider chain in order: skip providers whose breaker is open or
/// for which `call` declines to produce a future, return the first success
/// `accept` keeps, and record every attempt's outcome against its breaker.
///
/// A success the predicate declines still heals the provider's breaker; the
/// first declined value is remembered and returned only when no later
/// provider does better.
async fn run_chain_with<T, F, Fut, A>(
    providers: Vec<Arc<dyn MarketProvider>>,
    breakers: Arc<BreakerRegistry>,
    capability: Capability,
    timeout: Duration,
    call: F,
    accept: A,
) -> Result<T, DeskError>
where
    T: Send,
    F: Fn(Arc<dyn MarketProvider>) -> Option<Fut> + Send,
    Fut: Future<Output = Result<T, DeskError>> + Send,
    A: Fn(&T) -> bool + Send,
{
    let mut last_err: Option<DeskError> = None;
    let mut declined: Option<T> = None;
    for p in providers {
        let name = p.name();
        let gated = p.breaker_gated();
        let Some(fut) = call(p) else { continue };
        if gated && breakers.is_open(name) {
            debug!(provider = name, capability = %capability, "skipping provider, circuit open");
            last_err.get_or_insert_with(|| DeskError::circuit_open(name));
            continue;
        }
        match provider_call_with_timeout(name, capability, timeout, fut).await {
            Ok(v) => {
                breakers.record_success(name);
                if accept(&v) {
                    return Ok(v);
                }
                debug!(provider = name, capability = %capability, "empty result, trying next provider");
                declined.get_or_insert(v);
            }
            Err(e) => {
                if e.counts_against_breaker() {
                    breakers.record_failure(name);
                }
                warn!(provider = name, capability = %capability, error = %e, "provider attempt failed");
                last_err = Some(e);
            }
        }
    }
    if let Some(v) = declined {
        return Ok(v);
    }
    Err(last_err.unwrap_or_else(|| DeskError::unsupported(capability.as_str())))
}

/// Walk a provider chain in order and return the first success.
pub(crate) async fn run_chain<T, F, Fut>(
    providers: Vec<Arc<dyn MarketProvider>>,
    breakers: Arc<BreakerRegistry>,
    capability: Capability,
    timeout: Duration,
    call: F,
) -> Result<T, DeskError>
where
    T: Send,
    F: Fn(Arc<dyn MarketProvider>) -> Option<Fut> + Send,
    Fut: Future<Output = Result<T, DeskError>> + Send,
{
    run_chain_with(providers, breakers, capability, timeout, call, |_| true).await
}

impl Desk {
    /// Start building a new `Desk`.
    #[must_use]
    pub fn builder() -> DeskBuilder {
        DeskBuilder::new()
    }

    /// Providers eligible for a capability, preferred ones first; ties keep
    /// registration order.
    pub(crate) fn ordered_for(&self, capability: Capability) -> Vec<Arc<dyn MarketProvider>> {
        let mut out: Vec<(usize, Arc<dyn MarketProvider>)> =
            self.providers.iter().cloned().enumerate().collect();
        if let Some(pref) = self.priority.get(&capability) {
            let pos: HashMap<&'static str, usize> =
                pref.iter().enumerate().map(|(i, n)| (*n, i)).collect();
            out.sort_by_key(|(orig_i, p)| {
                (pos.get(p.name()).copied().unwrap_or(usize::MAX), *orig_i)
            });
        }
        out.into_iter().map(|(_, p)| p).collect()
    }

    /// Run the capability's provider chain against this desk's breakers.
    pub(crate) async fn attempt<T, F, Fut>(
        &self,
        capability: Capability,
        call: F,
    ) -> Result<T, DeskError>
    where
        T: Send,
        F: Fn(Arc<dyn MarketProvider>) -> Option<Fut> + Send,
        Fut: Future<Output = Result<T, DeskError>> + Send,
    {
        run_chain(
            self.ordered_for(capability),
            Arc::clone(&self.breakers),
            capability,
            self.cfg.provider_timeout,
            call,
        )
        .await
    }

    /// Like [`attempt`](Self::attempt), but for collection-valued chains
    /// where thin coverage is common: an empty collection from a healthy
    /// provider falls through to the next one, and empty is returned only
    /// when the whole chain agrees there is nothing.
    pub(crate) async fn attempt_non_empty<T, F, Fut>(
        &self,
        capability: Capability,
        call: F,
    ) -> Result<Vec<T>, DeskError>
    where
        T: Send,
        F: Fn(Arc<dyn MarketProvider>) -> Option<Fut> + Send,
        Fut: Future<Output = Result<Vec<T>, DeskError>> + Send,
    {
        run_chain_with(
            self.ordered_for(capability),
            Arc::clone(&self.breakers),
            capability,
            self.cfg.provider_timeout,
            call,
            |v| !v.is_empty(),
        )
        .await
    }

    /// TTL for dashboard-level aggregates: the configured minimum while the
    /// session is open, frozen until shortly after the next open otherwise.
    #[must_use]
    pub fn dashboard_ttl(&self) -> Duration {
        let now = Utc::now();
        if self.clock.is_open(now) {
            self.cfg.ttl.dashboard_min
        } else {
            self.clock
                .off_hours_freeze_ttl(now, self.cfg.ttl.dashboard_min)
        }
    }

    /// The trading-session clock this desk derives TTLs from.
    #[must_use]
    pub fn session(&self) -> &SessionClock {
        &self.clock
    }

    /// Whether a provider's circuit is currently open.
    #[must_use]
    pub fn circuit_open(&self, provider: &'static str) -> bool {
        self.breakers.is_open(provider)
    }
}
