//! Finnhub adapter: fast quote snapshot, symbol search, company news, and
//! daily candles. The free tier is cheap enough to try unconditionally, so
//! this provider opts out of breaker gating; it cannot serve index-class
//! symbols.

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use marketdesk_core::types::{NewsArticle, OhlcvBar, QuoteSnapshot, SearchResult};
use marketdesk_core::{
    DeskError, HistorySource, MarketProvider, NewsSource, QuoteSnapshotSource, SearchSource,
};
use serde::Deserialize;
use std::time::Duration;

use crate::client::{env_key, get_json, http_client, make_url};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Finnhub provider adapter.
pub struct Finnhub {
    client: reqwest::Client,
    base: String,
    key: String,
}

impl Finnhub {
    /// Breaker identity and log name.
    pub const NAME: &'static str = "finnhub";
    const TIMEOUT: Duration = Duration::from_secs(8);
    const RETRIES: u32 = 1;

    /// Build against the production endpoint.
    ///
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(key: impl Into<String>) -> Result<Self, DeskError> {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    /// Build with the key from `FINNHUB_API_KEY`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the variable is unset.
    pub fn from_env() -> Result<Self, DeskError> {
        Self::new(env_key("FINNHUB_API_KEY")?)
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
        let url = make_url(&self.base, path, params, ("token", &self.key))?;
        get_json(&self.client, Self::NAME, url, Self::RETRIES).await
    }
}

#[derive(Deserialize)]
struct QuoteWire {
    c: f64,
    d: Option<f64>,
    dp: Option<f64>,
    h: f64,
    l: f64,
}

#[derive(Deserialize)]
struct SearchWire {
    result: Vec<SearchHitWire>,
}

#[derive(Deserialize)]
struct SearchHitWire {
    symbol: String,
    description: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct NewsWire {
    id: i64,
    datetime: i64,
    headline: String,
    summary: String,
    source: String,
    url: String,
    image: String,
    related: String,
}

#[derive(Deserialize)]
struct CandlesWire {
    s: String,
    #[serde(default)]
    t: Vec<i64>,
    #[serde(default)]
    o: Vec<f64>,
    #[serde(default)]
    h: Vec<f64>,
    #[serde(default)]
    l: Vec<f64>,
    #[serde(default)]
    c: Vec<f64>,
    #[serde(default)]
    v: Vec<f64>,
}

impl MarketProvider for Finnhub {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn breaker_gated(&self) -> bool {
        false
    }

    fn serves_index_symbols(&self) -> bool {
        false
    }

    fn as_quote_snapshot_source(&self) -> Option<&dyn QuoteSnapshotSource> {
        Some(self)
    }
    fn as_search_source(&self) -> Option<&dyn SearchSource> {
        Some(self)
    }
    fn as_news_source(&self) -> Option<&dyn NewsSource> {
        Some(self)
    }
    fn as_history_source(&self) -> Option<&dyn HistorySource> {
        Some(self)
    }
}

#[async_trait]
impl QuoteSnapshotSource for Finnhub {
    async fn quote_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot, DeskError> {
        let wire: QuoteWire = self.get("quote", &[("symbol", symbol)]).await?;
        // Finnhub reports unknown symbols as an all-zero quote.
        if wire.c <= 0.0 {
            return Err(DeskError::not_found(format!("quote for {symbol}")));
        }
        Ok(QuoteSnapshot {
            price: wire.c,
            change: wire.d,
            change_pct: wire.dp,
            day_high: wire.h,
            day_low: wire.l,
        })
    }
}

#[async_trait]
impl SearchSource for Finnhub {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, DeskError> {
        let wire: SearchWire = self.get("search", &[("q", query)]).await?;
        Ok(wire
            .result
            .into_iter()
            .take(limit)
            .map(|hit| SearchResult {
                symbol: hit.symbol,
                name: hit.description,
                kind: hit.kind,
                exchange: String::new(),
            })
            .collect())
    }
}

#[async_trait]
impl NewsSource for Finnhub {
    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, DeskError> {
        let today = Utc::now().date_naive();
        let from = today
            .checked_sub_days(Days::new(30))
            .unwrap_or(today)
            .to_string();
        let to = today.to_string();
        let wire: Vec<NewsWire> = self
            .get(
                "company-news",
                &[("symbol", symbol), ("from", &from), ("to", &to)],
            )
            .await?;
        Ok(wire
            .into_iter()
            .filter_map(|a| {
                let published_at = DateTime::<Utc>::from_timestamp(a.datetime, 0)?;
                Some(NewsArticle {
                    id: format!("fh-{}", a.id),
                    title: a.headline,
                    summary: a.summary,
                    source: a.source,
                    url: a.url,
                    image: (!a.image.is_empty()).then_some(a.image),
                    published_at,
                    symbols: a
                        .related
                        .split(',')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                })
            })
            .take(limit)
            .collect())
    }
}

#[async_trait]
impl HistorySource for Finnhub {
    async fn daily_bars(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, DeskError> {
        let today = Utc::now().date_naive();
        let to_date = to.unwrap_or(today);
        let from_date = from.unwrap_or_else(|| to_date.checked_sub_days(Days::new(365)).unwrap_or(to_date));
        let from_ts = from_date.and_hms_opt(0, 0, 0).map_or(0, |d| d.and_utc().timestamp());
        let to_ts = to_date
            .and_hms_opt(23, 59, 59)
            .map_or(0, |d| d.and_utc().timestamp());

        let wire: CandlesWire = self
            .get(
                "stock/candle",
                &[
                    ("symbol", symbol),
                    ("resolution", "D"),
                    ("from", &from_ts.to_string()),
                    ("to", &to_ts.to_string()),
                ],
            )
            .await?;

        match wire.s.as_str() {
            "ok" => {
                let mut bars: Vec<OhlcvBar> = wire
                    .t
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &time)| {
                        Some(OhlcvBar {
                            time,
                            open: *wire.o.get(i)?,
                            high: *wire.h.get(i)?,
                            low: *wire.l.get(i)?,
                            close: *wire.c.get(i)?,
                            volume: wire.v.get(i).copied().unwrap_or(0.0) as u64,
                        })
                    })
                    .collect();
                bars.sort_by_key(|b| b.time);
                Ok(bars)
            }
            "no_data" => Ok(Vec::new()),
            other => Err(DeskError::Data(format!(
                "{}: candle status {other}",
                Self::NAME
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn adapter(server: &MockServer) -> Finnhub {
        Finnhub::with_base_url("test-key", server.base_url()).unwrap()
    }

    #[tokio::test]
    async fn snapshot_maps_price_fields() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/quote")
                .query_param("symbol", "AAPL")
                .query_param("token", "test-key");
            then.status(200).json_body(serde_json::json!({
                "c": 150.25, "d": 1.78, "dp": 1.2, "h": 151.0, "l": 148.5,
                "o": 149.0, "pc": 148.47, "t": 1_700_000_000
            }));
        });

        let snap = adapter(&server).quote_snapshot("AAPL").await.unwrap();
        mock.assert();
        assert_eq!(snap.price, 150.25);
        assert_eq!(snap.change, Some(1.78));
        assert_eq!(snap.change_pct, Some(1.2));
    }

    #[tokio::test]
    async fn zero_price_is_not_found_not_a_failure() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/quote");
            then.status(200).json_body(serde_json::json!({
                "c": 0.0, "d": null, "dp": null, "h": 0.0, "l": 0.0,
                "o": 0.0, "pc": 0.0, "t": 0
            }));
        });

        let err = adapter(&server).quote_snapshot("NOPE").await.unwrap_err();
        assert!(matches!(err, DeskError::NotFound { .. }));
        assert!(!err.counts_against_breaker());
    }

    #[tokio::test]
    async fn rate_limit_maps_to_dedicated_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/quote");
            then.status(429);
        });

        let err = adapter(&server).quote_snapshot("AAPL").await.unwrap_err();
        assert_eq!(err, DeskError::rate_limited("finnhub"));
    }

    #[tokio::test]
    async fn server_error_is_retried_once() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(500);
        });

        let err = adapter(&server).search("apple", 10).await.unwrap_err();
        assert!(matches!(err, DeskError::Provider { .. }));
        assert_eq!(mock.hits(), 2);
    }

    #[tokio::test]
    async fn candles_zip_into_ascending_bars() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/stock/candle");
            then.status(200).json_body(serde_json::json!({
                "s": "ok",
                "t": [1_700_086_400, 1_700_000_000],
                "o": [101.0, 100.0],
                "h": [102.0, 101.0],
                "l": [100.5, 99.0],
                "c": [101.5, 100.5],
                "v": [1200.0, 1000.0]
            }));
        });

        let bars = adapter(&server).daily_bars("AAPL", None, None).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert!(bars[0].time < bars[1].time);
        assert_eq!(bars[1].close, 101.5);
    }

    #[tokio::test]
    async fn no_data_candles_are_an_empty_success() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/stock/candle");
            then.status(200)
                .json_body(serde_json::json!({ "s": "no_data" }));
        });

        let bars = adapter(&server).daily_bars("THIN", None, None).await.unwrap();
        assert!(bars.is_empty());
    }

    #[tokio::test]
    async fn news_filters_empty_images_and_splits_related() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/company-news");
            then.status(200).json_body(serde_json::json!([{
                "id": 42, "datetime": 1_700_000_000,
                "headline": "Apple ships", "summary": "s", "source": "wire",
                "url": "https://example.com/a", "image": "",
                "related": "AAPL,MSFT", "category": "company"
            }]));
        });

        let articles = adapter(&server).news("AAPL", 15).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "fh-42");
        assert_eq!(articles[0].image, None);
        assert_eq!(articles[0].symbols, vec!["AAPL", "MSFT"]);
    }
}
