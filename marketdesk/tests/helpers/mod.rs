#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use marketdesk::{
    CompanyProfile, Desk, DeskBuilder, MarketProvider, NewsArticle, QuoteDetail, SearchResult,
};
use marketdesk_mock::MockProvider;

/// Coerce a concrete mock into the trait object the builder wants.
pub fn as_dyn(p: &Arc<MockProvider>) -> Arc<dyn MarketProvider> {
    let provider: Arc<dyn MarketProvider> = p.clone();
    provider
}

pub fn builder_with(providers: &[&Arc<MockProvider>]) -> DeskBuilder {
    let mut b = Desk::builder();
    for p in providers {
        b = b.with_provider(as_dyn(p));
    }
    b
}

pub fn desk_with(providers: &[&Arc<MockProvider>]) -> Desk {
    builder_with(providers).build().expect("desk builds")
}

pub fn detail(name: &str, price: f64) -> QuoteDetail {
    QuoteDetail {
        name: Some(name.to_string()),
        price,
        change: 1.6,
        change_pct: Some(1.08),
        volume: Some(52_000_000),
        market_cap: Some(2.4e12),
        pe_ratio: Some(28.4),
        year_high: Some(199.6),
        year_low: Some(124.2),
        exchange: Some("NASDAQ".to_string()),
    }
}

pub fn article(i: usize) -> NewsArticle {
    NewsArticle {
        id: format!("t-{i}"),
        title: format!("headline {i}"),
        summary: String::new(),
        source: "wire".to_string(),
        url: format!("https://example.com/{i}"),
        image: None,
        published_at: Utc.with_ymd_and_hms(2024, 6, 12, 14, 30, 0).unwrap(),
        symbols: vec!["AAPL".to_string()],
    }
}

pub fn hit(symbol: &str) -> SearchResult {
    SearchResult {
        symbol: symbol.to_string(),
        name: format!("{symbol} Inc."),
        kind: "Common Stock".to_string(),
        exchange: "NASDAQ".to_string(),
    }
}

pub fn profile(symbol: &str) -> CompanyProfile {
    CompanyProfile {
        symbol: symbol.to_string(),
        name: format!("{symbol} Inc."),
        description: "A company.".to_string(),
        sector: Some("Technology".to_string()),
        industry: None,
        exchange: Some("NASDAQ".to_string()),
        market_cap: Some(1.0e9),
        employees: Some(1_000),
        website: None,
        ceo: None,
        country: Some("US".to_string()),
        ipo_date: None,
        image: None,
    }
}
