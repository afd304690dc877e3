//! Downloads a small playlist through the retry engine with simulated failures.
//!
//! `cargo run --example download_retry` prints the engine's retry log lines.
use netresilience::telemetry::LogSink;
use netresilience::{is_online, presets, RetryEngine, RetryOverrides, Termination};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct FetchError(String);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    if !is_online().await {
        tracing::warn!("probe says offline; continuing with simulated transfers");
    }

    let engine = RetryEngine::builder()
        .defaults(presets::download())
        .telemetry(LogSink)
        .batch_concurrency(2)
        .build()
        .expect("engine");
    let config = engine
        .overridden(
            &RetryOverrides::new()
                .max_retries(3)
                .base_delay(Duration::from_millis(200))
                .timeout(Duration::from_secs(2)),
        )
        .expect("config");

    let scripts: [&[&str]; 4] = [
        &[],
        &["503 Service Unavailable", "read ECONNRESET"],
        &["Video not available"],
        &["429 Too Many Requests"; 8],
    ];

    let tracks: Vec<_> = scripts
        .into_iter()
        .enumerate()
        .map(|(index, script)| {
            let calls = Arc::new(AtomicUsize::new(0));
            move || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    match script.get(call) {
                        Some(message) => Err(FetchError(message.to_string())),
                        None => Ok(format!("track-{index}.opus")),
                    }
                }
            }
        })
        .collect();

    for outcome in engine.execute_batch_with(&config, "playlist", tracks).await {
        match outcome.termination() {
            Termination::Succeeded => println!(
                "saved {} after {} attempt(s) in {:?}",
                outcome.value().map(String::as_str).unwrap_or_default(),
                outcome.attempts(),
                outcome.elapsed()
            ),
            _ => println!(
                "gave up after {} attempt(s): {}",
                outcome.attempts(),
                outcome.failure().map(|e| e.message()).unwrap_or_default()
            ),
        }
    }
}
