//! Error types for the Download Station client.
//!
//! Every variant carries the name of the operation that failed so callers
//! (and logs) can tell a failed `list` from a failed `login` without
//! inspecting the URL.

use thiserror::Error;

/// Remote error code reported when the session id is invalid or expired.
pub const SESSION_EXPIRED_CODE: i64 = 105;

/// Errors that can occur while talking to the Download Station API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure (DNS, connection refused, TLS, unreadable body,
    /// non-success HTTP status).
    #[error("doing {operation} request: {source}")]
    Transport {
        /// Operation being executed.
        operation: &'static str,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The call did not complete within its deadline.
    #[error("{operation} request timed out after {timeout_secs}s")]
    Timeout {
        /// Operation being executed.
        operation: &'static str,
        /// Deadline that was exceeded, in whole seconds.
        timeout_secs: u64,
    },

    /// The caller cancelled the operation while it was in flight.
    #[error("{operation} request cancelled")]
    Cancelled {
        /// Operation being executed.
        operation: &'static str,
    },

    /// The response body is not a well-formed envelope of the expected shape.
    #[error("parsing {operation} response: {source}")]
    Decode {
        /// Operation being executed.
        operation: &'static str,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The envelope reported `success: false`.
    #[error("{operation} request error: code {code}")]
    Remote {
        /// Operation being executed.
        operation: &'static str,
        /// Remote error code, verbatim.
        code: i64,
    },

    /// The envelope succeeded but the server rejected an individual task.
    #[error("{operation} request error: task {id} failed with code {code}")]
    TaskRejected {
        /// Operation being executed.
        operation: &'static str,
        /// Task the server refused to change.
        id: String,
        /// Per-task error code.
        code: i64,
    },

    /// Logging in failed, either on first use or while refreshing an expired
    /// session.
    #[error("authentication failed during {operation}: {reason}")]
    Authentication {
        /// Operation that needed a session.
        operation: &'static str,
        /// Human-readable reason.
        reason: String,
        /// Login failure, or the expiry that triggered the refresh.
        #[source]
        source: Option<Box<ClientError>>,
    },

    /// The request URL could not be built.
    #[error("building {operation} request: {reason}")]
    InvalidRequest {
        /// Operation being executed.
        operation: &'static str,
        /// What was wrong with the template or its arguments.
        reason: String,
    },
}

impl ClientError {
    /// Creates a transport error from a reqwest error.
    pub fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { operation, source }
    }

    /// Creates a decode error.
    pub fn decode(operation: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { operation, source }
    }

    /// Creates a remote error from an envelope failure code.
    pub fn remote(operation: &'static str, code: i64) -> Self {
        Self::Remote { operation, code }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            operation,
            reason: reason.into(),
        }
    }

    /// Creates an authentication error wrapping the failure that caused it.
    pub fn authentication(
        operation: &'static str,
        reason: impl Into<String>,
        source: Option<ClientError>,
    ) -> Self {
        Self::Authentication {
            operation,
            reason: reason.into(),
            source: source.map(Box::new),
        }
    }

    /// Returns the remote error code, for envelope or per-task failures.
    #[must_use]
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            Self::Remote { code, .. } | Self::TaskRejected { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the envelope reported the session as invalid or expired.
    ///
    /// Only an envelope-level 105 counts; a per-task 105 does not.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                code: SESSION_EXPIRED_CODE,
                ..
            }
        )
    }

    /// Name of the operation that failed.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Transport { operation, .. }
            | Self::Timeout { operation, .. }
            | Self::Cancelled { operation }
            | Self::Decode { operation, .. }
            | Self::Remote { operation, .. }
            | Self::TaskRejected { operation, .. }
            | Self::Authentication { operation, .. }
            | Self::InvalidRequest { operation, .. } => *operation,
        }
    }
}
