#![cfg(feature = "serde")]

mod common;

use common::fail;
use netresilience::{ConfigError, RetryEngine, RetryOverrides, TrackingSleeper};
use std::time::Duration;

#[test]
fn json_overrides_merge_onto_engine_defaults() {
    let engine = RetryEngine::default();
    let overrides = RetryOverrides::from_json(
        r#"{"maxRetries": 2, "baseDelay": 100, "maxDelay": 1000, "backoffMultiplier": 3, "timeout": 5000}"#,
    )
    .unwrap();

    let cfg = engine.overridden(&overrides).unwrap();
    assert_eq!(cfg.max_retries(), 2);
    assert_eq!(cfg.base_delay(), Duration::from_millis(100));
    assert_eq!(cfg.max_delay(), Duration::from_secs(1));
    assert_eq!(cfg.backoff_multiplier(), 3.0);
    assert_eq!(cfg.timeout(), Duration::from_secs(5));
    assert!(cfg.jitter_enabled(), "unset fields keep engine defaults");
}

#[test]
fn invalid_json_values_are_rejected() {
    let overrides = RetryOverrides::from_json(r#"{"backoffMultiplier": 0.5}"#).unwrap();
    assert_eq!(
        RetryEngine::default().overridden(&overrides),
        Err(ConfigError::InvalidMultiplier(0.5))
    );
    assert!(matches!(RetryOverrides::from_json("[1, 2]"), Err(ConfigError::Parse(_))));
}

#[tokio::test]
async fn json_configured_session_uses_parsed_delays() {
    let sleeper = TrackingSleeper::new();
    let engine = RetryEngine::builder().sleeper(sleeper.clone()).build().unwrap();
    let cfg = engine
        .overridden(
            &RetryOverrides::from_json(r#"{"maxRetries": 2, "baseDelay": 100, "jitter": false}"#)
                .unwrap(),
        )
        .unwrap();

    let outcome = engine.execute_with(&cfg, "json", || async { Err::<(), _>(fail("502")) }).await;

    assert_eq!(outcome.attempts(), 3);
    assert_eq!(sleeper.calls(), vec![Duration::from_millis(100), Duration::from_millis(200)]);
}
