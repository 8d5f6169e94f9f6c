//! Deterministic mock provider for desk tests and CI-safe examples.
//!
//! Behavior is scripted per role through closures; roles without a closure
//! are reported as unsupported via the `as_*` accessors. Every adapter
//! invocation bumps a per-role call counter, which is how tests assert that
//! a breaker-gated provider was skipped without being called.

#![allow(clippy::type_complexity)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use marketdesk_core::types::{
    CompanyProfile, NewsArticle, Observation, OhlcvBar, QuoteDetail, QuoteSnapshot, SearchResult,
    SeriesInfo, SeriesQuery,
};
use marketdesk_core::{
    DeskError, HistorySource, MarketProvider, NewsSource, ProfileSource, QuoteDetailSource,
    QuoteSnapshotSource, SearchSource, SeriesSource,
};
use tokio::time::{Duration, sleep};

type SnapshotFn = dyn Fn(&str) -> Result<QuoteSnapshot, DeskError> + Send + Sync;
type DetailFn = dyn Fn(&str) -> Result<QuoteDetail, DeskError> + Send + Sync;
type HistoryFn =
    dyn Fn(&str, Option<NaiveDate>, Option<NaiveDate>) -> Result<Vec<OhlcvBar>, DeskError>
        + Send
        + Sync;
type NewsFn = dyn Fn(&str, usize) -> Result<Vec<NewsArticle>, DeskError> + Send + Sync;
type SearchFn = dyn Fn(&str, usize) -> Result<Vec<SearchResult>, DeskError> + Send + Sync;
type ObservationsFn =
    dyn Fn(&str, &SeriesQuery) -> Result<Vec<Observation>, DeskError> + Send + Sync;
type SeriesInfoFn = dyn Fn(&str) -> Result<SeriesInfo, DeskError> + Send + Sync;
type ProfileFn = dyn Fn(&str) -> Result<CompanyProfile, DeskError> + Send + Sync;

/// Scriptable in-memory provider.
pub struct MockProvider {
    name: &'static str,
    gated: bool,
    serves_index: bool,
    delay: Duration,

    snapshot_fn: Option<Arc<SnapshotFn>>,
    detail_fn: Option<Arc<DetailFn>>,
    history_fn: Option<Arc<HistoryFn>>,
    news_fn: Option<Arc<NewsFn>>,
    search_fn: Option<Arc<SearchFn>>,
    observations_fn: Option<Arc<ObservationsFn>>,
    series_info_fn: Option<Arc<SeriesInfoFn>>,
    profile_fn: Option<Arc<ProfileFn>>,

    snapshot_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    history_calls: AtomicUsize,
    news_calls: AtomicUsize,
    search_calls: AtomicUsize,
    observations_calls: AtomicUsize,
    series_info_calls: AtomicUsize,
    profile_calls: AtomicUsize,
}

impl MockProvider {
    /// Start building a mock.
    #[must_use]
    pub fn builder() -> MockProviderBuilder {
        MockProviderBuilder::new()
    }

    /// Times the snapshot adapter was actually invoked.
    pub fn snapshot_calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }
    /// Times the detail adapter was actually invoked.
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
    /// Times the history adapter was actually invoked.
    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
    /// Times the news adapter was actually invoked.
    pub fn news_calls(&self) -> usize {
        self.news_calls.load(Ordering::SeqCst)
    }
    /// Times the search adapter was actually invoked.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
    /// Times the observations adapter was actually invoked.
    pub fn observations_calls(&self) -> usize {
        self.observations_calls.load(Ordering::SeqCst)
    }
    /// Times the series-metadata adapter was actually invoked.
    pub fn series_info_calls(&self) -> usize {
        self.series_info_calls.load(Ordering::SeqCst)
    }
    /// Times the profile adapter was actually invoked.
    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

impl MarketProvider for MockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn breaker_gated(&self) -> bool {
        self.gated
    }

    fn serves_index_symbols(&self) -> bool {
        self.serves_index
    }

    fn as_quote_snapshot_source(&self) -> Option<&dyn QuoteSnapshotSource> {
        self.snapshot_fn
            .as_ref()
            .map(|_| self as &dyn QuoteSnapshotSource)
    }
    fn as_quote_detail_source(&self) -> Option<&dyn QuoteDetailSource> {
        self.detail_fn
            .as_ref()
            .map(|_| self as &dyn QuoteDetailSource)
    }
    fn as_history_source(&self) -> Option<&dyn HistorySource> {
        self.history_fn.as_ref().map(|_| self as &dyn HistorySource)
    }
    fn as_news_source(&self) -> Option<&dyn NewsSource> {
        self.news_fn.as_ref().map(|_| self as &dyn NewsSource)
    }
    fn as_search_source(&self) -> Option<&dyn SearchSource> {
        self.search_fn.as_ref().map(|_| self as &dyn SearchSource)
    }
    fn as_series_source(&self) -> Option<&dyn SeriesSource> {
        self.observations_fn
            .as_ref()
            .map(|_| self as &dyn SeriesSource)
    }
    fn as_profile_source(&self) -> Option<&dyn ProfileSource> {
        self.profile_fn.as_ref().map(|_| self as &dyn ProfileSource)
    }
}

#[async_trait]
impl QuoteSnapshotSource for MockProvider {
    async fn quote_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot, DeskError> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        match &self.snapshot_fn {
            Some(f) => f(symbol),
            None => Err(DeskError::unsupported("quote")),
        }
    }
}

#[async_trait]
impl QuoteDetailSource for MockProvider {
    async fn quote_detail(&self, symbol: &str) -> Result<QuoteDetail, DeskError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        match &self.detail_fn {
            Some(f) => f(symbol),
            None => Err(DeskError::unsupported("quote-enrichment")),
        }
    }
}

#[async_trait]
impl HistorySource for MockProvider {
    async fn daily_bars(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, DeskError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        match &self.history_fn {
            Some(f) => f(symbol, from, to),
            None => Err(DeskError::unsupported("history")),
        }
    }
}

#[async_trait]
impl NewsSource for MockProvider {
    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, DeskError> {
        self.news_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        match &self.news_fn {
            Some(f) => f(symbol, limit),
            None => Err(DeskError::unsupported("news")),
        }
    }
}

#[async_trait]
impl SearchSource for MockProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, DeskError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        match &self.search_fn {
            Some(f) => f(query, limit),
            None => Err(DeskError::unsupported("search")),
        }
    }
}

#[async_trait]
impl SeriesSource for MockProvider {
    async fn observations(
        &self,
        series_id: &str,
        query: &SeriesQuery,
    ) -> Result<Vec<Observation>, DeskError> {
        self.observations_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        match &self.observations_fn {
            Some(f) => f(series_id, query),
            None => Err(DeskError::unsupported("macro-series")),
        }
    }

    async fn series_info(&self, series_id: &str) -> Result<SeriesInfo, DeskError> {
        self.series_info_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        match &self.series_info_fn {
            Some(f) => f(series_id),
            None => Err(DeskError::unsupported("macro-series")),
        }
    }
}

#[async_trait]
impl ProfileSource for MockProvider {
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile, DeskError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        match &self.profile_fn {
            Some(f) => f(symbol),
            None => Err(DeskError::unsupported("profile")),
        }
    }
}

/// Builder for [`MockProvider`].
pub struct MockProviderBuilder {
    name: &'static str,
    gated: bool,
    serves_index: bool,
    delay: Duration,
    snapshot_fn: Option<Arc<SnapshotFn>>,
    detail_fn: Option<Arc<DetailFn>>,
    history_fn: Option<Arc<HistoryFn>>,
    news_fn: Option<Arc<NewsFn>>,
    search_fn: Option<Arc<SearchFn>>,
    observations_fn: Option<Arc<ObservationsFn>>,
    series_info_fn: Option<Arc<SeriesInfoFn>>,
    profile_fn: Option<Arc<ProfileFn>>,
}

impl Default for MockProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProviderBuilder {
    /// Create a builder with no scripted roles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "mock",
            gated: true,
            serves_index: true,
            delay: Duration::ZERO,
            snapshot_fn: None,
            detail_fn: None,
            history_fn: None,
            news_fn: None,
            search_fn: None,
            observations_fn: None,
            series_info_fn: None,
            profile_fn: None,
        }
    }

    /// Provider name (breaker identity).
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Bypass the circuit breaker like a cheap free-tier primary.
    #[must_use]
    pub fn ungated(mut self) -> Self {
        self.gated = false;
        self
    }

    /// Refuse index-class symbols.
    #[must_use]
    pub fn no_index_symbols(mut self) -> Self {
        self.serves_index = false;
        self
    }

    /// Latency added before every scripted response.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Script the snapshot role with a closure.
    #[must_use]
    pub fn with_snapshot_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<QuoteSnapshot, DeskError> + Send + Sync + 'static,
    {
        self.snapshot_fn = Some(Arc::new(f));
        self
    }

    /// Always answer the snapshot role with `snap`.
    #[must_use]
    pub fn returns_snapshot_ok(self, snap: QuoteSnapshot) -> Self {
        self.with_snapshot_fn(move |_| Ok(snap))
    }

    /// Script the detail role with a closure.
    #[must_use]
    pub fn with_detail_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<QuoteDetail, DeskError> + Send + Sync + 'static,
    {
        self.detail_fn = Some(Arc::new(f));
        self
    }

    /// Always answer the detail role with `detail`.
    #[must_use]
    pub fn returns_detail_ok(self, detail: QuoteDetail) -> Self {
        self.with_detail_fn(move |_| Ok(detail.clone()))
    }

    /// Script the history role with a closure.
    #[must_use]
    pub fn with_history_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Option<NaiveDate>, Option<NaiveDate>) -> Result<Vec<OhlcvBar>, DeskError>
            + Send
            + Sync
            + 'static,
    {
        self.history_fn = Some(Arc::new(f));
        self
    }

    /// Always answer the history role with `bars`.
    #[must_use]
    pub fn returns_history_ok(self, bars: Vec<OhlcvBar>) -> Self {
        self.with_history_fn(move |_, _, _| Ok(bars.clone()))
    }

    /// Script the news role with a closure.
    #[must_use]
    pub fn with_news_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) -> Result<Vec<NewsArticle>, DeskError> + Send + Sync + 'static,
    {
        self.news_fn = Some(Arc::new(f));
        self
    }

    /// Always answer the news role with `articles`.
    #[must_use]
    pub fn returns_news_ok(self, articles: Vec<NewsArticle>) -> Self {
        self.with_news_fn(move |_, _| Ok(articles.clone()))
    }

    /// Script the search role with a closure.
    #[must_use]
    pub fn with_search_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) -> Result<Vec<SearchResult>, DeskError> + Send + Sync + 'static,
    {
        self.search_fn = Some(Arc::new(f));
        self
    }

    /// Always answer the search role with `hits`.
    #[must_use]
    pub fn returns_search_ok(self, hits: Vec<SearchResult>) -> Self {
        self.with_search_fn(move |_, _| Ok(hits.clone()))
    }

    /// Script the observations role with a closure.
    #[must_use]
    pub fn with_observations_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &SeriesQuery) -> Result<Vec<Observation>, DeskError> + Send + Sync + 'static,
    {
        self.observations_fn = Some(Arc::new(f));
        self
    }

    /// Always answer the observations role with `obs`.
    #[must_use]
    pub fn returns_observations_ok(self, obs: Vec<Observation>) -> Self {
        self.with_observations_fn(move |_, _| Ok(obs.clone()))
    }

    /// Script the series-metadata role with a closure.
    #[must_use]
    pub fn with_series_info_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<SeriesInfo, DeskError> + Send + Sync + 'static,
    {
        self.series_info_fn = Some(Arc::new(f));
        self
    }

    /// Script the profile role with a closure.
    #[must_use]
    pub fn with_profile_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<CompanyProfile, DeskError> + Send + Sync + 'static,
    {
        self.profile_fn = Some(Arc::new(f));
        self
    }

    /// Always answer the profile role with `profile`.
    #[must_use]
    pub fn returns_profile_ok(self, profile: CompanyProfile) -> Self {
        self.with_profile_fn(move |_| Ok(profile.clone()))
    }

    /// Finish the mock.
    #[must_use]
    pub fn build(self) -> Arc<MockProvider> {
        Arc::new(MockProvider {
            name: self.name,
            gated: self.gated,
            serves_index: self.serves_index,
            delay: self.delay,
            snapshot_fn: self.snapshot_fn,
            detail_fn: self.detail_fn,
            history_fn: self.history_fn,
            news_fn: self.news_fn,
            search_fn: self.search_fn,
            observations_fn: self.observations_fn,
            series_info_fn: self.series_info_fn,
            profile_fn: self.profile_fn,
            snapshot_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            news_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            observations_calls: AtomicUsize::new(0),
            series_info_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
        })
    }
}

/// Snapshot fixture with all-equal day range.
#[must_use]
pub fn snapshot(price: f64, change: f64, change_pct: f64) -> QuoteSnapshot {
    QuoteSnapshot {
        price,
        change: Some(change),
        change_pct: Some(change_pct),
        day_high: price,
        day_low: price,
    }
}

/// Bar fixture with all OHLC equal to `close`.
#[must_use]
pub fn bar(time: i64, close: f64) -> OhlcvBar {
    OhlcvBar {
        time,
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000,
    }
}

/// Observation fixture.
#[must_use]
pub fn obs(y: i32, m: u32, d: u32, value: f64) -> Observation {
    Observation {
        date: NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date"),
        value: Some(value),
    }
}
