#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use netresilience::RetryConfig;

/// Failure whose message drives classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TestError(pub String);

pub fn fail(message: &str) -> TestError {
    TestError(message.to_string())
}

/// Deterministic config: no jitter, doubling from `base_ms`.
pub fn plain_config(max_retries: u32, base_ms: u64) -> RetryConfig {
    RetryConfig::builder()
        .max_retries(max_retries)
        .base_delay(Duration::from_millis(base_ms))
        .max_delay(Duration::from_secs(30))
        .backoff_multiplier(2.0)
        .jitter(false)
        .build()
        .expect("valid config")
}

/// In-memory writer for capturing formatted log output.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
