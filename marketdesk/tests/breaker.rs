mod helpers;

use std::time::Duration;

use helpers::{builder_with, desk_with, detail};
use marketdesk::DeskError;
use marketdesk_mock::{MockProvider, snapshot};

#[tokio::test]
async fn three_failures_open_the_circuit_and_skip_the_adapter() {
    let flaky = MockProvider::builder()
        .name("flaky")
        .with_detail_fn(|_| Err(DeskError::provider("flaky", "boom")))
        .build();
    let desk = desk_with(&[&flaky]);

    // Distinct symbols so each attempt misses the cache.
    for symbol in ["AAPL", "MSFT", "GOOG"] {
        assert!(desk.quote(symbol).await.is_none());
    }
    assert_eq!(flaky.detail_calls(), 3);
    assert!(desk.circuit_open("flaky"));

    // Open circuit: the attempt is skipped without touching the adapter.
    assert!(desk.quote("AMZN").await.is_none());
    assert_eq!(flaky.detail_calls(), 3);
}

#[tokio::test]
async fn not_found_is_a_healthy_outcome_and_never_trips() {
    let honest = MockProvider::builder()
        .name("honest")
        .with_detail_fn(|symbol| Err(DeskError::not_found(format!("quote for {symbol}"))))
        .build();
    let desk = desk_with(&[&honest]);

    for symbol in ["A1", "A2", "A3", "A4", "A5"] {
        assert!(desk.quote(symbol).await.is_none());
    }
    assert_eq!(honest.detail_calls(), 5);
    assert!(!desk.circuit_open("honest"));
}

#[tokio::test]
async fn ungated_provider_is_always_attempted() {
    let primary = MockProvider::builder()
        .name("primary")
        .ungated()
        .with_snapshot_fn(|_| Err(DeskError::provider("primary", "boom")))
        .build();
    let desk = desk_with(&[&primary]);

    for symbol in ["A1", "A2", "A3", "A4"] {
        assert!(desk.quote(symbol).await.is_none());
    }
    // Failures accumulate past the threshold but never gate the provider.
    assert_eq!(primary.snapshot_calls(), 4);
}

#[tokio::test]
async fn open_circuit_falls_through_to_the_next_provider() {
    let flaky = MockProvider::builder()
        .name("flaky")
        .with_detail_fn(|_| Err(DeskError::provider("flaky", "boom")))
        .build();
    let steady = MockProvider::builder()
        .name("steady")
        .returns_detail_ok(detail("Apple Inc.", 149.9))
        .build();
    let desk = desk_with(&[&flaky, &steady]);

    // Every attempt fails over to the healthy provider while flaky racks up
    // failures.
    for symbol in ["A1", "A2", "A3"] {
        assert!(desk.quote(symbol).await.is_some());
    }
    assert_eq!(flaky.detail_calls(), 3);
    assert!(desk.circuit_open("flaky"));

    let q = desk.quote("AAPL").await.expect("fallback quote");
    assert_eq!(q.price, 149.9);
    assert_eq!(flaky.detail_calls(), 3);
}

#[tokio::test]
async fn losing_enrichment_attempts_still_feed_the_breaker() {
    let primary = MockProvider::builder()
        .name("primary")
        .ungated()
        .returns_snapshot_ok(snapshot(150.25, 1.78, 1.2))
        .build();
    let slow_flaky = MockProvider::builder()
        .name("slow-flaky")
        .delay(Duration::from_millis(150))
        .with_detail_fn(|_| Err(DeskError::provider("slow-flaky", "boom")))
        .build();
    let desk = builder_with(&[&primary, &slow_flaky])
        .enrich_timeout(Duration::from_millis(20))
        .build()
        .unwrap();

    // Each quote returns before its enrichment attempt resolves.
    for symbol in ["AAPL", "MSFT", "GOOG"] {
        assert!(desk.quote(symbol).await.is_some());
    }
    assert!(!desk.circuit_open("slow-flaky"));

    // Once the detached attempts finish, their failures have been recorded.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(slow_flaky.detail_calls(), 3);
    assert!(desk.circuit_open("slow-flaky"));
}
