//! Per-call deadline and cancellation.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::error::ClientError;

/// Default per-call timeout (30 seconds).
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Deadline and cancellation signal for one client operation.
///
/// The timeout bounds every individual transport call; the token aborts the
/// in-flight call as soon as it is cancelled.
#[derive(Debug, Clone)]
pub struct CallContext {
    timeout: Duration,
    cancel: CancellationToken,
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS))
    }
}

impl CallContext {
    /// Creates a context with a fresh, never-cancelled token.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::with_cancellation(timeout, CancellationToken::new())
    }

    /// Creates a context tied to an existing cancellation token.
    #[must_use]
    pub fn with_cancellation(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    /// Timeout applied to each transport call.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The cancellation token observed by this context.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs `call`, aborting it on cancellation or when the timeout elapses.
    pub(crate) async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(ClientError::Cancelled { operation });
        }

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ClientError::Cancelled { operation }),
            result = tokio::time::timeout(self.timeout, call) => {
                result.unwrap_or(Err(ClientError::Timeout {
                    operation,
                    timeout_secs: self.timeout.as_secs(),
                }))
            }
        }
    }
}
