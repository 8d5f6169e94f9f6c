//! Financial Modeling Prep adapter: descriptive quotes, company profiles,
//! daily history, and stock news. FMP is the enrichment and fallback source,
//! so it stays behind the circuit breaker; it is also the only adapter that
//! serves index-class symbols.

use async_trait::async_trait;
use chrono::NaiveDate;
use marketdesk_core::types::{CompanyProfile, NewsArticle, OhlcvBar, QuoteDetail};
use marketdesk_core::{
    DeskError, HistorySource, MarketProvider, NewsSource, ProfileSource, QuoteDetailSource,
};
use serde::Deserialize;
use std::time::Duration;

use crate::client::{env_key, get_json, http_client, make_url};

/// Production endpoint (the `/stable` API surface).
pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Financial Modeling Prep provider adapter.
pub struct Fmp {
    client: reqwest::Client,
    base: String,
    key: String,
}

impl Fmp {
    /// Breaker identity and log name.
    pub const NAME: &'static str = "fmp";
    const TIMEOUT: Duration = Duration::from_secs(5);
    const RETRIES: u32 = 1;

    /// Build against the production endpoint.
    ///
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(key: impl Into<String>) -> Result<Self, DeskError> {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    /// Build with the key from `FMP_API_KEY`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the variable is unset.
    pub fn from_env() -> Result<Self, DeskError> {
        Self::new(env_key("FMP_API_KEY")?)
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
        let url = make_url(&self.base, path, params, ("apikey", &self.key))?;
        get_json(&self.client, Self::NAME, url, Self::RETRIES).await
    }
}

#[derive(Deserialize)]
struct QuoteWire {
    name: Option<String>,
    price: f64,
    #[serde(default)]
    change: f64,
    #[serde(alias = "changesPercentage")]
    #[serde(rename = "changePercentage")]
    change_percentage: Option<f64>,
    #[serde(rename = "yearHigh")]
    year_high: Option<f64>,
    #[serde(rename = "yearLow")]
    year_low: Option<f64>,
    #[serde(rename = "marketCap")]
    market_cap: Option<f64>,
    volume: Option<f64>,
    exchange: Option<String>,
    pe: Option<f64>,
}

/// FMP reports headcount as either a string or a number depending on the
/// endpoint revision.
#[derive(Deserialize)]
#[serde(untagged)]
enum Headcount {
    Text(String),
    Count(u64),
}

impl Headcount {
    fn into_u64(self) -> Option<u64> {
        match self {
            Self::Text(s) => s.trim().parse().ok(),
            Self::Count(n) => Some(n),
        }
    }
}

#[derive(Deserialize)]
struct ProfileWire {
    #[serde(rename = "companyName")]
    company_name: Option<String>,
    #[serde(default)]
    description: String,
    sector: Option<String>,
    industry: Option<String>,
    exchange: Option<String>,
    #[serde(rename = "mktCap", alias = "marketCap")]
    market_cap: Option<f64>,
    #[serde(rename = "fullTimeEmployees")]
    full_time_employees: Option<Headcount>,
    website: Option<String>,
    ceo: Option<String>,
    country: Option<String>,
    #[serde(rename = "ipoDate")]
    ipo_date: Option<String>,
    image: Option<String>,
}

#[derive(Deserialize)]
struct BarWire {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

#[derive(Deserialize)]
struct NewsWire {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: String,
    title: String,
    image: Option<String>,
    site: String,
    #[serde(default)]
    text: String,
    url: String,
}

impl MarketProvider for Fmp {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn as_quote_detail_source(&self) -> Option<&dyn QuoteDetailSource> {
        Some(self)
    }
    fn as_profile_source(&self) -> Option<&dyn ProfileSource> {
        Some(self)
    }
    fn as_history_source(&self) -> Option<&dyn HistorySource> {
        Some(self)
    }
    fn as_news_source(&self) -> Option<&dyn NewsSource> {
        Some(self)
    }
}

#[async_trait]
impl QuoteDetailSource for Fmp {
    async fn quote_detail(&self, symbol: &str) -> Result<QuoteDetail, DeskError> {
        let wire: Vec<QuoteWire> = self.get("quote", &[("symbol", symbol)]).await?;
        let q = wire
            .into_iter()
            .next()
            .ok_or_else(|| DeskError::not_found(format!("quote for {symbol}")))?;
        Ok(QuoteDetail {
            name: q.name,
            price: q.price,
            change: q.change,
            change_pct: q.change_percentage,
            volume: q.volume.map(|v| v as u64),
            market_cap: q.market_cap,
            pe_ratio: q.pe,
            year_high: q.year_high,
            year_low: q.year_low,
            exchange: q.exchange,
        })
    }
}

#[async_trait]
impl ProfileSource for Fmp {
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile, DeskError> {
        let wire: Vec<ProfileWire> = self.get("profile", &[("symbol", symbol)]).await?;
        let p = wire
            .into_iter()
            .next()
            .ok_or_else(|| DeskError::not_found(format!("profile for {symbol}")))?;
        Ok(CompanyProfile {
            symbol: symbol.to_string(),
            name: p.company_name.unwrap_or_else(|| symbol.to_string()),
            description: p.description,
            sector: p.sector,
            industry: p.industry,
            exchange: p.exchange,
            market_cap: p.market_cap,
            employees: p.full_time_employees.and_then(Headcount::into_u64),
            website: p.website,
            ceo: p.ceo,
            country: p.country,
            ipo_date: p
                .ipo_date
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            image: p.image,
        })
    }
}

#[async_trait]
impl HistorySource for Fmp {
    async fn daily_bars(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, DeskError> {
        let from_s = from.map(|d| d.to_string());
        let to_s = to.map(|d| d.to_string());
        let mut params = vec![("symbol", symbol)];
        if let Some(f) = from_s.as_deref() {
            params.push(("from", f));
        }
        if let Some(t) = to_s.as_deref() {
            params.push(("to", t));
        }
        let wire: Vec<BarWire> = self.get("historical-price-eod/full", &params).await?;

        // Endpoint returns newest-first; bars are served oldest-first.
        let mut bars: Vec<OhlcvBar> = wire
            .into_iter()
            .filter_map(|b| {
                let date = NaiveDate::parse_from_str(&b.date, "%Y-%m-%d").ok()?;
                Some(OhlcvBar {
                    time: date.and_hms_opt(0, 0, 0)?.and_utc().timestamp(),
                    open: b.open,
                    high: b.high,
                    low: b.low,
                    close: b.close,
                    volume: b.volume as u64,
                })
            })
            .collect();
        bars.sort_by_key(|b| b.time);
        Ok(bars)
    }
}

#[async_trait]
impl NewsSource for Fmp {
    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, DeskError> {
        let limit_s = limit.to_string();
        let wire: Vec<NewsWire> = self
            .get("news", &[("symbol", symbol), ("limit", &limit_s)])
            .await?;
        Ok(wire
            .into_iter()
            .filter_map(|a| {
                let published_at = chrono::NaiveDateTime::parse_from_str(
                    &a.published_date,
                    "%Y-%m-%d %H:%M:%S",
                )
                .ok()?
                .and_utc();
                Some(NewsArticle {
                    id: a.url.clone(),
                    title: a.title,
                    summary: a.text,
                    source: a.site,
                    url: a.url,
                    image: a.image.filter(|i| !i.is_empty()),
                    published_at,
                    symbols: a.symbol.into_iter().collect(),
                })
            })
            .take(limit)
            .collect())
    }
}
