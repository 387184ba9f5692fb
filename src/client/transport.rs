//! HTTP transport for Download Station calls.
//!
//! Download Station ships with a self-signed certificate, so the reqwest
//! client used here skips certificate verification. Only the configured API
//! host is ever contacted through it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::error::ClientError;
use super::request::redacted;

/// Default connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Executes one GET request and returns the raw response body.
///
/// Implementations must not retry; retry policy lives in the client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET against `url`, bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] on connection failure, non-success
    /// HTTP status or unreadable body, and [`ClientError::Timeout`] when the
    /// deadline passes.
    async fn get(
        &self,
        operation: &'static str,
        url: &Url,
        timeout: Duration,
    ) -> Result<Vec<u8>, ClientError>;
}

/// reqwest-backed [`Transport`]. Create once and share.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the given connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the TLS backend cannot be
    /// initialized.
    pub fn new(connect_timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("downtown/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .map_err(|e| ClientError::transport("client setup", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self, url))]
    async fn get(
        &self,
        operation: &'static str,
        url: &Url,
        timeout: Duration,
    ) -> Result<Vec<u8>, ClientError> {
        debug!(name = operation, method = "GET", url = %redacted(url), "executing DS request");

        let result = async {
            let response = self
                .client
                .get(url.clone())
                .timeout(timeout)
                .send()
                .await?
                .error_for_status()?;
            response.bytes().await
        }
        .await;

        match result {
            Ok(body) => Ok(body.to_vec()),
            Err(e) if e.is_timeout() => {
                debug!(name = operation, error = %e, "Request timed out");
                Err(ClientError::Timeout {
                    operation,
                    timeout_secs: timeout.as_secs(),
                })
            }
            Err(e) => {
                debug!(name = operation, error = %e, "Error executing request");
                Err(ClientError::transport(operation, e.without_url()))
            }
        }
    }
}
