mod helpers;

use std::sync::Arc;

use chrono::NaiveDate;
use helpers::{article, as_dyn, desk_with, hit, profile};
use marketdesk::{Capability, Desk, DeskError, MarketProvider};
use marketdesk_mock::{MockProvider, bar, obs};

#[tokio::test]
async fn history_falls_back_in_registration_order() {
    let alpha = MockProvider::builder()
        .name("alpha")
        .with_history_fn(|_, _, _| Err(DeskError::provider("alpha", "boom")))
        .build();
    let beta = MockProvider::builder()
        .name("beta")
        .returns_history_ok(vec![bar(1_700_000_000, 100.5), bar(1_700_086_400, 101.5)])
        .build();
    let desk = desk_with(&[&alpha, &beta]);

    let bars = desk.history("AAPL", None, None).await;
    assert_eq!(bars.len(), 2);
    assert_eq!(alpha.history_calls(), 1);
    assert_eq!(beta.history_calls(), 1);
}

#[tokio::test]
async fn preferred_provider_is_consulted_first() {
    let alpha = MockProvider::builder()
        .name("alpha")
        .returns_history_ok(vec![bar(1_700_000_000, 1.0)])
        .build();
    let beta = MockProvider::builder()
        .name("beta")
        .returns_history_ok(vec![bar(1_700_000_000, 2.0)])
        .build();
    let preferred: Vec<Arc<dyn MarketProvider>> = vec![as_dyn(&beta)];
    let desk = Desk::builder()
        .with_provider(as_dyn(&alpha))
        .with_provider(as_dyn(&beta))
        .prefer_for(Capability::History, &preferred)
        .build()
        .unwrap();

    let bars = desk.history("AAPL", None, None).await;
    assert_eq!(bars[0].close, 2.0);
    assert_eq!(alpha.history_calls(), 0);
    assert_eq!(beta.history_calls(), 1);
}

#[tokio::test]
async fn preference_is_per_capability() {
    let alpha = MockProvider::builder()
        .name("alpha")
        .returns_history_ok(vec![bar(1_700_000_000, 1.0)])
        .returns_search_ok(vec![hit("AAPL")])
        .build();
    let beta = MockProvider::builder()
        .name("beta")
        .returns_history_ok(vec![bar(1_700_000_000, 2.0)])
        .returns_search_ok(vec![hit("MSFT")])
        .build();
    let preferred: Vec<Arc<dyn MarketProvider>> = vec![as_dyn(&beta)];
    let desk = Desk::builder()
        .with_provider(as_dyn(&alpha))
        .with_provider(as_dyn(&beta))
        .prefer_for(Capability::History, &preferred)
        .build()
        .unwrap();

    // History follows the preference; search keeps registration order.
    desk.history("AAPL", None, None).await;
    desk.search("apple").await;
    assert_eq!(beta.history_calls(), 1);
    assert_eq!(alpha.search_calls(), 1);
    assert_eq!(beta.search_calls(), 0);
}

#[tokio::test]
async fn empty_history_falls_through_to_a_provider_with_data() {
    let thin = MockProvider::builder()
        .name("thin")
        .returns_history_ok(vec![])
        .build();
    let deep = MockProvider::builder()
        .name("deep")
        .returns_history_ok(vec![bar(1_700_000_000, 100.5)])
        .build();
    let desk = desk_with(&[&thin, &deep]);

    let bars = desk.history("AAPL", None, None).await;
    assert_eq!(bars.len(), 1);
    assert_eq!(thin.history_calls(), 1);
    assert_eq!(deep.history_calls(), 1);
    // An empty answer is still a healthy one.
    assert!(!desk.circuit_open("thin"));
}

#[tokio::test]
async fn empty_news_falls_through_to_the_next_source() {
    let quiet = MockProvider::builder()
        .name("quiet")
        .returns_news_ok(vec![])
        .build();
    let wire = MockProvider::builder()
        .name("wire")
        .returns_news_ok(vec![article(0), article(1)])
        .build();
    let desk = desk_with(&[&quiet, &wire]);

    let articles = desk.news("AAPL").await;
    assert_eq!(articles.len(), 2);
    assert_eq!(quiet.news_calls(), 1);
    assert_eq!(wire.news_calls(), 1);
}

#[tokio::test]
async fn history_empty_across_the_whole_chain_is_cached() {
    let thin = MockProvider::builder()
        .name("thin")
        .returns_history_ok(vec![])
        .build();
    let desk = desk_with(&[&thin]);

    let from = NaiveDate::from_ymd_opt(2024, 6, 10);
    assert!(desk.history("THIN", from, None).await.is_empty());
    assert!(desk.history("THIN", from, None).await.is_empty());
    assert_eq!(thin.history_calls(), 1);
}

#[tokio::test]
async fn search_cache_key_folds_case_and_whitespace() {
    let finder = MockProvider::builder()
        .name("finder")
        .returns_search_ok(vec![hit("AAPL")])
        .build();
    let desk = desk_with(&[&finder]);

    let first = desk.search("Apple").await;
    let second = desk.search("  apple ").await;
    assert_eq!(first, second);
    assert_eq!(finder.search_calls(), 1);
}

#[tokio::test]
async fn news_is_capped_at_the_configured_limit() {
    let wire = MockProvider::builder()
        .name("wire")
        .returns_news_ok((0..40).map(article).collect())
        .build();
    let desk = desk_with(&[&wire]);

    let articles = desk.news("AAPL").await;
    assert_eq!(articles.len(), 15);
}

#[tokio::test]
async fn profile_is_held_in_the_long_lived_cache() {
    let reference = MockProvider::builder()
        .name("reference")
        .returns_profile_ok(profile("AAPL"))
        .build();
    let desk = desk_with(&[&reference]);

    let p = desk.profile("aapl").await.expect("profile");
    assert_eq!(p.name, "AAPL Inc.");
    desk.profile("AAPL").await.expect("profile");
    assert_eq!(reference.profile_calls(), 1);
}

#[tokio::test]
async fn exhausted_chain_yields_absence_not_panic() {
    // A provider with no scripted roles serves nothing.
    let inert = MockProvider::builder().name("inert").build();
    let desk = desk_with(&[&inert]);

    assert!(desk.quote("AAPL").await.is_none());
    assert!(desk.history("AAPL", None, None).await.is_empty());
    assert!(desk.news("AAPL").await.is_empty());
    assert!(desk.search("apple").await.is_empty());
    assert!(desk.profile("AAPL").await.is_none());
    assert!(desk.macro_series("FEDFUNDS", &Default::default()).await.is_none());
}

#[tokio::test]
async fn series_queries_with_different_options_miss_separately() {
    let fred = MockProvider::builder()
        .name("fred")
        .returns_observations_ok(vec![obs(2024, 5, 1, 5.33)])
        .build();
    let desk = desk_with(&[&fred]);

    let narrow = marketdesk::SeriesQuery {
        limit: Some(12),
        ..Default::default()
    };
    desk.macro_series("FEDFUNDS", &Default::default()).await;
    desk.macro_series("fedfunds", &Default::default()).await; // cache hit
    desk.macro_series("FEDFUNDS", &narrow).await; // different key
    assert_eq!(fred.observations_calls(), 2);
}
