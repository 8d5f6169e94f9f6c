use chrono::{Months, Utc};
use marketdesk_core::types::{Observation, SeriesInfo, SeriesQuery};
use marketdesk_core::{Capability, DeskError};
use tracing::{info, warn};

use crate::core::Desk;

/// Macro series the dashboard always displays; used for startup warm-up.
pub const KEY_MACRO_SERIES: [&str; 8] = [
    "FEDFUNDS", "CPIAUCSL", "GDP", "UNRATE", "DGS10", "DGS2", "T10Y2Y", "VIXCLS",
];

impl Desk {
    /// Fetch observations for a macroeconomic series.
    ///
    /// The query's date range, limit, and frequency participate in the cache
    /// key. Returns `None` when every provider fails; absence is never
    /// cached.
    pub async fn macro_series(
        &self,
        series_id: &str,
        query: &SeriesQuery,
    ) -> Option<Vec<Observation>> {
        let id = series_id.trim().to_ascii_uppercase();
        if id.is_empty() {
            return None;
        }
        let key = format!("fred:obs:{id}:{}", query.cache_fragment());
        self.stores
            .series
            .cached(&key, self.cfg.ttl.macro_series, || {
                self.observations_uncached(&id, query)
            })
            .await
            .inspect_err(|e| warn!(series = %id, error = %e, "macro series unavailable"))
            .ok()
    }

    /// Fetch metadata for a macroeconomic series.
    pub async fn macro_series_info(&self, series_id: &str) -> Option<SeriesInfo> {
        let id = series_id.trim().to_ascii_uppercase();
        if id.is_empty() {
            return None;
        }
        let key = format!("fred:meta:{id}");
        self.stores
            .series_info
            .cached(&key, self.cfg.ttl.macro_meta, || self.series_info_uncached(&id))
            .await
            .inspect_err(|e| warn!(series = %id, error = %e, "series metadata unavailable"))
            .ok()
    }

    /// Warm the macro caches at startup: fetch one year of observations plus
    /// metadata for each series, concurrently, ignoring failures. Returns
    /// how many series produced observations.
    pub async fn precache_macro_series(&self, ids: &[&str]) -> usize {
        let year_ago = Utc::now()
            .date_naive()
            .checked_sub_months(Months::new(12));
        let query = SeriesQuery {
            start: year_ago,
            ..SeriesQuery::default()
        };

        let tasks = ids.iter().map(|id| {
            let query = query.clone();
            async move {
                let obs = self.macro_series(id, &query).await;
                self.macro_series_info(id).await;
                obs.is_some()
            }
        });

        let warmed = futures::future::join_all(tasks)
            .await
            .into_iter()
            .filter(|ok| *ok)
            .count();
        info!(requested = ids.len(), warmed, "macro series precache complete");
        warmed
    }

    async fn observations_uncached(
        &self,
        series_id: &str,
        query: &SeriesQuery,
    ) -> Result<Vec<Observation>, DeskError> {
        self.attempt(Capability::MacroSeries, |p| {
            p.as_series_source()?;
            let id = series_id.to_string();
            let query = query.clone();
            Some(async move {
                match p.as_series_source() {
                    Some(src) => src.observations(&id, &query).await,
                    None => Err(DeskError::unsupported(Capability::MacroSeries.as_str())),
                }
            })
        })
        .await
    }

    async fn series_info_uncached(&self, series_id: &str) -> Result<SeriesInfo, DeskError> {
        self.attempt(Capability::MacroSeries, |p| {
            p.as_series_source()?;
            let id = series_id.to_string();
            Some(async move {
                match p.as_series_source() {
                    Some(src) => src.series_info(&id).await,
                    None => Err(DeskError::unsupported(Capability::MacroSeries.as_str())),
                }
            })
        })
        .await
    }
}
