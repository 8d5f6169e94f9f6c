//! Twelve Data adapter: daily history only, as the last resort in the
//! history chain. Every numeric field in the time-series payload arrives as
//! a string and is parsed here; the range filter is applied client-side
//! because the endpoint is sized by `outputsize`, not by dates.

use async_trait::async_trait;
use chrono::NaiveDate;
use marketdesk_core::types::OhlcvBar;
use marketdesk_core::{DeskError, HistorySource, MarketProvider};
use serde::Deserialize;
use std::time::Duration;

use crate::client::{env_key, get_json, http_client, make_url};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.twelvedata.com";

/// Roughly one year of trading days.
const DEFAULT_OUTPUT_SIZE: u32 = 252;

/// Twelve Data provider adapter.
pub struct TwelveData {
    client: reqwest::Client,
    base: String,
    key: String,
}

impl TwelveData {
    /// Breaker identity and log name.
    pub const NAME: &'static str = "twelvedata";
    const TIMEOUT: Duration = Duration::from_secs(8);
    const RETRIES: u32 = 1;

    /// Build against the production endpoint.
    ///
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(key: impl Into<String>) -> Result<Self, DeskError> {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    /// Build with the key from `TWELVE_DATA_API_KEY`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the variable is unset.
    pub fn from_env() -> Result<Self, DeskError> {
        Self::new(env_key("TWELVE_DATA_API_KEY")?)
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
}

#[derive(Deserialize)]
struct SeriesWire {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    values: Vec<ValueWire>,
}

#[derive(Deserialize)]
struct ValueWire {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    #[serde(default)]
    volume: Option<String>,
}

fn parse_num(provider: &'static str, field: &str, raw: &str) -> Result<f64, DeskError> {
    raw.parse::<f64>()
        .map_err(|_| DeskError::Data(format!("{provider}: unparseable {field} {raw:?}")))
}

impl MarketProvider for TwelveData {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn as_history_source(&self) -> Option<&dyn HistorySource> {
        Some(self)
    }
}

#[async_trait]
impl HistorySource for TwelveData {
    async fn daily_bars(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, DeskError> {
        let outputsize = DEFAULT_OUTPUT_SIZE.to_string();
        let url = make_url(
            &self.base,
            "time_series",
            &[
                ("symbol", symbol),
                ("interval", "1day"),
                ("outputsize", &outputsize),
            ],
            ("apikey", &self.key),
        )?;
        let wire: SeriesWire = get_json(&self.client, Self::NAME, url, Self::RETRIES).await?;

        if wire.status.as_deref() == Some("error") {
            let msg = wire.message.unwrap_or_else(|| "unspecified error".into());
            return Err(DeskError::provider(Self::NAME, msg));
        }

        let mut bars = Vec::with_capacity(wire.values.len());
        for v in wire.values {
            let Ok(date) = NaiveDate::parse_from_str(&v.datetime, "%Y-%m-%d") else {
                return Err(DeskError::Data(format!(
                    "{}: unparseable datetime {:?}",
                    Self::NAME,
                    v.datetime
                )));
            };
            if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
                continue;
            }
            let time = date
                .and_hms_opt(0, 0, 0)
                .map_or(0, |d| d.and_utc().timestamp());
            bars.push(OhlcvBar {
                time,
                open: parse_num(Self::NAME, "open", &v.open)?,
                high: parse_num(Self::NAME, "high", &v.high)?,
                low: parse_num(Self::NAME, "low", &v.low)?,
                close: parse_num(Self::NAME, "close", &v.close)?,
                volume: v
                    .volume
                    .as_deref()
                    .and_then(|raw| raw.parse::<f64>().ok())
                    .unwrap_or(0.0) as u64,
            });
        }
        bars.sort_by_key(|b| b.time);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn adapter(server: &MockServer) -> TwelveData {
        TwelveData::with_base_url("test-key", server.base_url()).unwrap()
    }

    #[tokio::test]
    async fn string_fields_parse_into_ascending_bars() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/time_series")
                .query_param("symbol", "AAPL")
                .query_param("interval", "1day");
            then.status(200).json_body(serde_json::json!({
                "meta": { "symbol": "AAPL", "interval": "1day" },
                "values": [
                    { "datetime": "2024-06-12", "open": "101.0", "high": "102.0",
                      "low": "100.5", "close": "101.5", "volume": "1200" },
                    { "datetime": "2024-06-11", "open": "100.0", "high": "101.0",
                      "low": "99.0", "close": "100.5", "volume": "1000" }
                ],
                "status": "ok"
            }));
        });

        let bars = adapter(&server).daily_bars("AAPL", None, None).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert!(bars[0].time < bars[1].time);
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(bars[1].volume, 1200);
    }

    #[tokio::test]
    async fn range_is_filtered_client_side() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/time_series");
            then.status(200).json_body(serde_json::json!({
                "values": [
                    { "datetime": "2024-06-12", "open": "101.0", "high": "102.0",
                      "low": "100.5", "close": "101.5", "volume": "1200" },
                    { "datetime": "2024-06-01", "open": "100.0", "high": "101.0",
                      "low": "99.0", "close": "100.5", "volume": "1000" }
                ],
                "status": "ok"
            }));
        });

        let from = NaiveDate::from_ymd_opt(2024, 6, 10);
        let bars = adapter(&server).daily_bars("AAPL", from, None).await.unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 101.5);
    }

    #[tokio::test]
    async fn error_status_maps_to_provider_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/time_series");
            then.status(200).json_body(serde_json::json!({
                "status": "error",
                "message": "symbol not supported",
                "code": 400
            }));
        });

        let err = adapter(&server).daily_bars("BAD", None, None).await.unwrap_err();
        assert_eq!(err, DeskError::provider("twelvedata", "symbol not supported"));
        assert!(err.counts_against_breaker());
    }

    #[tokio::test]
    async fn unparseable_price_is_a_data_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/time_series");
            then.status(200).json_body(serde_json::json!({
                "values": [
                    { "datetime": "2024-06-12", "open": "oops", "high": "102.0",
                      "low": "100.5", "close": "101.5", "volume": "1200" }
                ],
                "status": "ok"
            }));
        });

        let err = adapter(&server).daily_bars("AAPL", None, None).await.unwrap_err();
        assert!(matches!(err, DeskError::Data(_)));
    }
}
