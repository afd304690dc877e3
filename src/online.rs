//! Best-effort reachability check.
//!
//! Sends a `HEAD` request to a well-known host and reports whether a 2xx response came back
//! within the timeout. Any error or timeout reads as offline. The answer is a hint for
//! callers deciding whether to start a batch of downloads, not a guarantee.

use reqwest::Client;
use std::time::Duration;

/// Target of [`is_online`].
pub const DEFAULT_PROBE_URL: &str = "https://www.google.com/favicon.ico";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Reachability probe against a fixed URL.
#[derive(Debug, Clone)]
pub struct OnlineProbe {
    client: Client,
    url: String,
    timeout: Duration,
}

impl Default for OnlineProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_URL, DEFAULT_PROBE_TIMEOUT)
    }
}

impl OnlineProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(Client::new(), url, timeout)
    }

    /// Probe through a preconfigured client (proxy settings, TLS roots, ...).
    pub fn with_client(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self { client, url: url.into(), timeout }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `true` only if the target answered with a success status in time.
    pub async fn check(&self) -> bool {
        let request = self.client.head(&self.url).timeout(self.timeout).send();
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                let status = response.status();
                tracing::debug!(url = %self.url, %status, "online probe answered");
                status.is_success()
            }
            Ok(Err(error)) => {
                tracing::debug!(url = %self.url, %error, "online probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(url = %self.url, timeout_ms = self.timeout.as_millis() as u64, "online probe timed out");
                false
            }
        }
    }
}

/// Probe [`DEFAULT_PROBE_URL`] with a 5 second timeout.
pub async fn is_online() -> bool {
    OnlineProbe::default().check().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn direct_client() -> Client {
        Client::builder().no_proxy().build().expect("client")
    }

    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/favicon.ico")
    }

    #[tokio::test]
    async fn success_status_reads_online() {
        let url = serve_once("HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
        let probe = OnlineProbe::with_client(direct_client(), url, Duration::from_secs(2));
        assert!(probe.check().await);
    }

    #[tokio::test]
    async fn error_status_reads_offline() {
        let url = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let probe = OnlineProbe::with_client(direct_client(), url, Duration::from_secs(2));
        assert!(!probe.check().await);
    }

    #[tokio::test]
    async fn silent_endpoint_times_out_offline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let probe = OnlineProbe::with_client(
            direct_client(),
            format!("http://{addr}/"),
            Duration::from_millis(200),
        );
        let start = std::time::Instant::now();
        assert!(!probe.check().await);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn refused_connection_reads_offline() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let probe =
            OnlineProbe::with_client(direct_client(), format!("http://{addr}/"), Duration::from_secs(2));
        assert!(!probe.check().await);
    }

    #[test]
    fn default_probe_targets_favicon() {
        let probe = OnlineProbe::default();
        assert_eq!(probe.url(), DEFAULT_PROBE_URL);
        assert_eq!(probe.timeout(), Duration::from_secs(5));
    }
}
