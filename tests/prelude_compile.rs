//! Compile-time prelude coverage test.
use netresilience::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn prelude_reexports_core_types() {
    let _backoff = Backoff::exponential(Duration::from_millis(100), 2.0).unwrap();
    let _jitter = Jitter::None;
    let config = RetryConfig::default()
        .merge(&RetryOverrides::new().max_retries(0).jitter(false))
        .expect("valid overrides");

    let sink = MemorySink::new();
    let engine = RetryEngine::builder().defaults(config).telemetry(sink.clone()).build().unwrap();
    let outcome: OperationOutcome<()> =
        engine.execute("prelude", || async { Ok::<_, std::io::Error>(()) }).await;

    assert_eq!(outcome.termination(), Termination::Succeeded);
    assert!(matches!(sink.events().as_slice(), [RetryEvent::Succeeded { .. }]));
}
