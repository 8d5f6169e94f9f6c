//! Runs a desk against scripted in-memory providers and walks through the
//! failure modes: enrichment racing, provider fallback, and breaker tripping.
//!
//! ```sh
//! cargo run --example desk_demo
//! ```

use std::sync::Arc;
use std::time::Duration;

use marketdesk::{Desk, DeskError, MarketProvider, QuoteDetail};
use marketdesk_mock::{MockProvider, snapshot};

#[tokio::main]
async fn main() -> Result<(), DeskError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketdesk=debug".into()),
        )
        .init();

    let primary = MockProvider::builder()
        .name("primary")
        .ungated()
        .returns_snapshot_ok(snapshot(150.25, 1.78, 1.2))
        .build();

    // Enrichment that answers, but slower than the desk is willing to wait.
    let enricher = MockProvider::builder()
        .name("enricher")
        .delay(Duration::from_secs(3))
        .returns_detail_ok(QuoteDetail {
            name: Some("Apple Inc.".into()),
            price: 150.1,
            market_cap: Some(2.4e12),
            ..QuoteDetail::default()
        })
        .build();

    let flaky = MockProvider::builder()
        .name("flaky")
        .with_history_fn(|_, _, _| Err(DeskError::provider("flaky", "simulated outage")))
        .build();

    let desk = Desk::builder()
        .with_provider({
            let p: Arc<dyn MarketProvider> = primary.clone();
            p
        })
        .with_provider({
            let p: Arc<dyn MarketProvider> = enricher.clone();
            p
        })
        .with_provider({
            let p: Arc<dyn MarketProvider> = flaky.clone();
            p
        })
        .build()?;

    // The price arrives on time; the slow enrichment loses the race and the
    // descriptive fields stay at their defaults.
    let quote = desk.quote("AAPL").await;
    println!("quote: {quote:#?}");

    // Three failed history attempts open flaky's circuit.
    for symbol in ["AAPL", "MSFT", "GOOG"] {
        let bars = desk.history(symbol, None, None).await;
        println!("history for {symbol}: {} bars", bars.len());
    }
    println!("flaky circuit open: {}", desk.circuit_open("flaky"));

    // The next history call skips flaky entirely.
    desk.history("AMZN", None, None).await;
    println!("flaky adapter invocations: {}", flaky.history_calls());

    Ok(())
}
