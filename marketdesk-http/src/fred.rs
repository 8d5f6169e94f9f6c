//! FRED (Federal Reserve Economic Data) adapter: macroeconomic series
//! observations and metadata. FRED encodes a missing observation as the
//! literal string `"."`; those points come through as `None` rather than
//! being dropped or zeroed.

use async_trait::async_trait;
use marketdesk_core::types::{Observation, SeriesInfo, SeriesQuery, SortOrder};
use marketdesk_core::{DeskError, MarketProvider, SeriesSource};
use serde::Deserialize;
use std::time::Duration;

use crate::client::{env_key, get_json, http_client, make_url};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// FRED provider adapter.
pub struct Fred {
    client: reqwest::Client,
    base: String,
    key: String,
}

impl Fred {
    /// Breaker identity and log name.
    pub const NAME: &'static str = "fred";
    const TIMEOUT: Duration = Duration::from_secs(10);
    const RETRIES: u32 = 2;

    /// Build against the production endpoint.
    ///
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(key: impl Into<String>) -> Result<Self, DeskError> {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    /// Build with the key from `FRED_API_KEY`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the variable is unset.
    pub fn from_env() -> Result<Self, DeskError> {
        Self::new(env_key("FRED_API_KEY")?)
    }

    /// Build against an alternate endpoint (tests point this at a local
    /// mock server).
    ///
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed.
    pub fn with_base_url(key: impl Into<String>, base: impl Into<String>) -> Result<Self, DeskError> {
        Ok(Self {
            client: http_client(Self::TIMEOUT)?,
            base: base.into(),
            key: key.into(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, DeskError> {
        let mut all: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        all.extend_from_slice(params);
        all.push(("file_type", "json"));
        let url = make_url(&self.base, path, &all, ("api_key", &self.key))?;
        get_json(&self.client, Self::NAME, url, Self::RETRIES).await
    }
}

#[derive(Deserialize)]
struct ObservationsWire {
    observations: Vec<ObservationWire>,
}

#[derive(Deserialize)]
struct ObservationWire {
    date: chrono::NaiveDate,
    value: String,
}

#[derive(Deserialize)]
struct SeriesWire {
    seriess: Vec<SeriesInfoWire>,
}

#[derive(Deserialize)]
struct SeriesInfoWire {
    id: String,
    title: String,
    frequency: String,
    units: String,
    last_updated: String,
    notes: Option<String>,
}

impl MarketProvider for Fred {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn as_series_source(&self) -> Option<&dyn SeriesSource> {
        Some(self)
    }
}

#[async_trait]
impl SeriesSource for Fred {
    async fn observations(
        &self,
        series_id: &str,
        query: &SeriesQuery,
    ) -> Result<Vec<Observation>, DeskError> {
        let start = query.start.map(|d| d.to_string());
        let end = query.end.map(|d| d.to_string());
        let limit = query.limit.map(|l| l.to_string());
        let sort = match query.sort {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        };

        let mut params = vec![("series_id", series_id), ("sort_order", sort)];
        if let Some(s) = start.as_deref() {
            params.push(("observation_start", s));
        }
        if let Some(e) = end.as_deref() {
            params.push(("observation_end", e));
        }
        if let Some(l) = limit.as_deref() {
            params.push(("limit", l));
        }
        if let Some(f) = query.frequency.as_deref() {
            params.push(("frequency", f));
        }

        let wire: ObservationsWire = self.get("series/observations", &params).await?;
        Ok(wire
            .observations
            .into_iter()
            .map(|o| Observation {
                date: o.date,
                value: o.value.parse::<f64>().ok(),
            })
            .collect())
    }

    async fn series_info(&self, series_id: &str) -> Result<SeriesInfo, DeskError> {
        let wire: SeriesWire = self.get("series", &[("series_id", series_id)]).await?;
        let s = wire
            .seriess
            .into_iter()
            .next()
            .ok_or_else(|| DeskError::not_found(format!("series {series_id}")))?;
        Ok(SeriesInfo {
            id: s.id,
            title: s.title,
            frequency: s.frequency,
            units: s.units,
            last_updated: s.last_updated,
            notes: s.notes,
        })
    }
}
