//! Memo Proxy demo
//!
//! Runs a payment gateway and a large data source behind memoizing proxies
//! and reports what the caches saved.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memo_proxy::services::{LargeDataSource, PaymentGateway, PaymentRequest};
use memo_proxy::{MemoizingProxy, ProxyConfig, Service};

/// Simulated round trip of each real service call
const SIMULATED_LATENCY: Duration = Duration::from_millis(200);

/// Main entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load proxy configuration from environment variables
/// 3. Charge the same payment twice, then a different one
/// 4. Fetch the large dataset twice
/// 5. Print proxy statistics as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memo_proxy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ProxyConfig::from_env();
    info!(
        "Configuration loaded: max_entries={:?}, cache_failures={}",
        config.max_entries, config.cache_failures
    );

    let gateway = Arc::new(PaymentGateway::new().with_latency(SIMULATED_LATENCY));
    let payments = MemoizingProxy::with_config(Arc::clone(&gateway), &config);

    for request in [
        PaymentRequest::new(50.0, "USD"),
        PaymentRequest::new(50.0, "USD"),
        PaymentRequest::new(100.0, "USD"),
    ] {
        let (approved, outcome) = payments.perform_traced(&request).await;
        let approved = approved.context("payment gateway failed")?;
        info!(
            amount = request.amount,
            currency = %request.currency,
            approved,
            ?outcome,
            "Payment answered"
        );
    }

    let source = Arc::new(LargeDataSource::new().with_latency(SIMULATED_LATENCY));
    let data = MemoizingProxy::with_config(Arc::clone(&source), &config);

    for _ in 0..2 {
        let payload = data.perform(&()).await.context("data source failed")?;
        info!(records = payload.records.len(), fetched_at = %payload.fetched_at, "Data answered");
    }

    info!(
        gateway_calls = gateway.calls(),
        source_calls = source.calls(),
        "Real services invoked"
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "payments": payments.stats().await,
            "data": data.stats().await,
        }))?
    );

    Ok(())
}
