//! Result shapes served by the data-access layer.
//!
//! A [`Quote`] is assembled from two partial views: a [`QuoteSnapshot`]
//! (fast primary source, authoritative for price/change) and an optional
//! [`QuoteDetail`] (slower enrichment source, fills in descriptive fields).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fully assembled quote as exposed to the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Normalized (uppercased) ticker symbol.
    pub symbol: String,
    /// Display name; falls back to the symbol when no enrichment arrived.
    pub name: String,
    /// Last traded price.
    pub price: f64,
    /// Absolute change since previous close.
    pub change: f64,
    /// Percent change since previous close.
    pub change_pct: f64,
    /// Day volume; zero when unknown.
    pub volume: u64,
    /// Market capitalization; zero when unknown.
    pub market_cap: f64,
    /// Trailing P/E ratio, when the enrichment source reports one.
    pub pe_ratio: Option<f64>,
    /// 52-week high; the primary day high stands in when enrichment is absent.
    pub week52_high: f64,
    /// 52-week low; the primary day low stands in when enrichment is absent.
    pub week52_low: f64,
    /// Listing exchange; empty when unknown.
    pub exchange: String,
    /// When this quote was assembled.
    pub updated_at: DateTime<Utc>,
}

/// Fast primary price snapshot (Finnhub-class source).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// Current price. A non-positive value marks the snapshot invalid.
    pub price: f64,
    /// Absolute change since previous close, when reported.
    pub change: Option<f64>,
    /// Percent change since previous close, when reported.
    pub change_pct: Option<f64>,
    /// Day high.
    pub day_high: f64,
    /// Day low.
    pub day_low: f64,
}

impl QuoteSnapshot {
    /// A snapshot is usable only when the source reported a real price.
    #[must_use]
    pub fn has_valid_price(&self) -> bool {
        self.price > 0.0
    }
}

/// Descriptive quote from an enrichment/fallback source (FMP-class source).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuoteDetail {
    /// Display name.
    pub name: Option<String>,
    /// Last traded price.
    pub price: f64,
    /// Absolute change since previous close.
    pub change: f64,
    /// Percent change since previous close.
    pub change_pct: Option<f64>,
    /// Day volume.
    pub volume: Option<u64>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Trailing P/E ratio.
    pub pe_ratio: Option<f64>,
    /// 52-week high.
    pub year_high: Option<f64>,
    /// 52-week low.
    pub year_low: Option<f64>,
    /// Listing exchange.
    pub exchange: Option<String>,
}

impl Quote {
    /// Assemble a quote from the primary snapshot, optionally enriched.
    ///
    /// Primary price/change fields always win; enrichment only fills the
    /// descriptive gaps (name, volume, market cap, P/E, 52-week range,
    /// exchange).
    #[must_use]
    pub fn from_snapshot(
        symbol: &str,
        snap: &QuoteSnapshot,
        enrichment: Option<&QuoteDetail>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: enrichment
                .and_then(|d| d.name.clone())
                .unwrap_or_else(|| symbol.to_string()),
            price: snap.price,
            change: snap.change.unwrap_or(0.0),
            change_pct: snap.change_pct.unwrap_or(0.0),
            volume: enrichment.and_then(|d| d.volume).unwrap_or(0),
            market_cap: enrichment.and_then(|d| d.market_cap).unwrap_or(0.0),
            pe_ratio: enrichment.and_then(|d| d.pe_ratio),
            week52_high: enrichment
                .and_then(|d| d.year_high)
                .unwrap_or(snap.day_high),
            week52_low: enrichment.and_then(|d| d.year_low).unwrap_or(snap.day_low),
            exchange: enrichment
                .and_then(|d| d.exchange.clone())
                .unwrap_or_default(),
            updated_at,
        }
    }

    /// Assemble a quote entirely from a detail source (index symbols, or the
    /// fallback path when the primary snapshot failed).
    #[must_use]
    pub fn from_detail(symbol: &str, detail: &QuoteDetail, updated_at: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: detail.name.clone().unwrap_or_else(|| symbol.to_string()),
            price: detail.price,
            change: detail.change,
            change_pct: detail.change_pct.unwrap_or(0.0),
            volume: detail.volume.unwrap_or(0),
            market_cap: detail.market_cap.unwrap_or(0.0),
            pe_ratio: detail.pe_ratio,
            week52_high: detail.year_high.unwrap_or(0.0),
            week52_low: detail.year_low.unwrap_or(0.0),
            exchange: detail.exchange.clone().unwrap_or_default(),
            updated_at,
        }
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    /// Bar timestamp as Unix seconds.
    pub time: i64,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: u64,
}

/// One news article attached to a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Provider-scoped stable identifier (e.g. "fh-12345").
    pub id: String,
    /// Headline.
    pub title: String,
    /// Short summary or body excerpt.
    pub summary: String,
    /// Publishing outlet.
    pub source: String,
    /// Canonical article URL.
    pub url: String,
    /// Thumbnail image URL, when available.
    pub image: Option<String>,
    /// RFC 3339 publication timestamp.
    pub published_at: DateTime<Utc>,
    /// Symbols the article relates to.
    pub symbols: Vec<String>,
}

/// One symbol-search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Ticker symbol.
    pub symbol: String,
    /// Instrument description/name.
    pub name: String,
    /// Instrument type as reported by the provider (e.g. "Common Stock").
    pub kind: String,
    /// Listing exchange; empty when the provider omits it.
    pub exchange: String,
}

/// Company reference data (long-TTL cacheable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// Business description.
    pub description: String,
    /// Sector classification.
    pub sector: Option<String>,
    /// Industry classification.
    pub industry: Option<String>,
    /// Listing exchange.
    pub exchange: Option<String>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Headcount.
    pub employees: Option<u64>,
    /// Corporate website.
    pub website: Option<String>,
    /// Chief executive.
    pub ceo: Option<String>,
    /// Country of incorporation.
    pub country: Option<String>,
    /// IPO date, when known.
    pub ipo_date: Option<NaiveDate>,
    /// Logo image URL.
    pub image: Option<String>,
}

/// One observation of a macroeconomic series.
///
/// A missing value (FRED encodes these as `"."`) is `None`, not zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date.
    pub date: NaiveDate,
    /// Observed value; `None` when the source marks the point missing.
    pub value: Option<f64>,
}

/// Metadata describing a macroeconomic series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesInfo {
    /// Series identifier (e.g. "FEDFUNDS").
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Native reporting frequency (e.g. "Monthly").
    pub frequency: String,
    /// Units of the observations.
    pub units: String,
    /// When the source last updated the series.
    pub last_updated: String,
    /// Free-form notes, when present.
    pub notes: Option<String>,
}

/// Sort order for macro series observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Oldest observation first.
    #[default]
    Ascending,
    /// Newest observation first.
    Descending,
}

/// Query options for a macro series fetch. The date range, limit, and
/// frequency participate in the cache key; sort order does not, so two
/// queries differing only in ordering share one cached entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeriesQuery {
    /// Earliest observation date to include.
    pub start: Option<NaiveDate>,
    /// Latest observation date to include.
    pub end: Option<NaiveDate>,
    /// Maximum number of observations.
    pub limit: Option<u32>,
    /// Observation ordering.
    pub sort: SortOrder,
    /// Frequency aggregation requested from the source (e.g. "m", "q").
    pub frequency: Option<String>,
}

impl SeriesQuery {
    /// Deterministic cache-key fragment: date range, limit, and frequency.
    #[must_use]
    pub fn cache_fragment(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.start.map(|d| d.to_string()).unwrap_or_default(),
            self.end.map(|d| d.to_string()).unwrap_or_default(),
            self.limit.map(|l| l.to_string()).unwrap_or_default(),
            self.frequency.clone().unwrap_or_default(),
        )
    }
}

/// Normalize a user-supplied symbol for routing and cache keys.
#[must_use]
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}
