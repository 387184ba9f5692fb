//! Decoding of the `{success, error: {code}, data}` envelope that wraps every
//! Download Station response.
//!
//! Decoding happens in two steps: the envelope itself is read with an
//! untyped payload, and only a successful envelope has its payload converted
//! into the operation's expected type. A failed envelope therefore never
//! produces a decode error because of a malformed `data` field.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::ClientError;

/// Error block of an envelope. Only meaningful when `success` is false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    /// Remote error code.
    #[serde(default)]
    pub code: i64,
}

/// The uniform response wrapper, generic over its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the remote call succeeded.
    pub success: bool,
    /// Failure details; absent on most successful responses.
    #[serde(default)]
    pub error: EnvelopeError,
    /// Operation payload; must not be trusted when `success` is false.
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Converts the envelope into its payload or a [`ClientError::Remote`].
    ///
    /// A successful envelope without data yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Remote`] when `success` is false.
    pub fn into_result(self, operation: &'static str) -> Result<Option<T>, ClientError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ClientError::remote(operation, self.error.code))
        }
    }
}

/// Decodes a raw response body into the payload type `T`.
///
/// A successful envelope with missing or `null` data is handed to `T` as JSON
/// `null`, so `()` and `Option<_>` payloads decode while structured payloads
/// fail with [`ClientError::Decode`].
///
/// # Errors
///
/// - [`ClientError::Decode`] when the body is not an envelope, or the payload
///   does not match `T`.
/// - [`ClientError::Remote`] when the envelope reports failure.
pub fn decode<T: DeserializeOwned>(operation: &'static str, body: &[u8]) -> Result<T, ClientError> {
    let envelope: Envelope<Value> = serde_json::from_slice(body).map_err(|e| {
        debug!(name = operation, error = %e, "Error parsing response");
        ClientError::decode(operation, e)
    })?;

    let data = envelope.into_result(operation).inspect_err(|e| {
        debug!(name = operation, code = ?e.remote_code(), "Request error");
    })?;

    serde_json::from_value(data.unwrap_or(Value::Null)).map_err(|e| {
        debug!(name = operation, error = %e, "Error parsing response data");
        ClientError::decode(operation, e)
    })
}
