//! Lazy session establishment with a single re-login on session expiry.
//!
//! Authenticated operations run through a three-state machine:
//!
//! ```text
//! NoSession ──login──▶ SessionActive ──code 105──▶ Retrying ──login──▶ final attempt
//!     │                     │                         │
//!     └─ login fails ─▶ Authentication error          └─ login fails ─▶ Authentication error
//!                           └─ success / other error ─▶ returned as-is
//! ```
//!
//! `Retrying` never transitions back into `SessionActive`; its attempt is the
//! last one, so a call re-authenticates at most once.

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::DsClient;
use super::context::CallContext;
use super::error::ClientError;
use super::request::Endpoint;
use super::session::Session;

enum AuthState {
    NoSession,
    SessionActive(Session),
    Retrying(ClientError),
}

impl DsClient {
    /// Runs an authenticated call, establishing or refreshing the session as
    /// needed.
    ///
    /// A session obtained along the way is written to the store once the call
    /// finishes, unless the call was cancelled.
    pub(crate) async fn authenticated<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        args: &[&str],
        ctx: &CallContext,
    ) -> Result<T, ClientError> {
        let mut fresh = None;
        let result = self.drive(endpoint, args, ctx, &mut fresh).await;

        if let Some(session) = fresh
            && !matches!(result, Err(ClientError::Cancelled { .. }))
        {
            self.sessions.set(session);
        }
        result
    }

    async fn drive<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        args: &[&str],
        ctx: &CallContext,
        fresh: &mut Option<Session>,
    ) -> Result<T, ClientError> {
        let mut state = match self.sessions.get() {
            Some(session) => AuthState::SessionActive(session),
            None => AuthState::NoSession,
        };

        loop {
            state = match state {
                AuthState::NoSession => {
                    debug!(name = endpoint.name, "no session, logging in");
                    let session = self.reauthenticate(endpoint.name, None, ctx).await?;
                    *fresh = Some(session.clone());
                    AuthState::SessionActive(session)
                }
                AuthState::SessionActive(session) => {
                    match self.call_with_session(endpoint, args, &session, ctx).await {
                        Err(e) if e.is_session_expired() => {
                            info!(name = endpoint.name, "session expired, logging in again");
                            AuthState::Retrying(e)
                        }
                        other => return other,
                    }
                }
                AuthState::Retrying(expired) => {
                    let session = self
                        .reauthenticate(endpoint.name, Some(expired), ctx)
                        .await?;
                    *fresh = Some(session.clone());
                    return self.call_with_session(endpoint, args, &session, ctx).await;
                }
            };
        }
    }

    async fn call_with_session<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        args: &[&str],
        session: &Session,
        ctx: &CallContext,
    ) -> Result<T, ClientError> {
        let url = super::request::build_authenticated(&self.origin, endpoint, args, session.sid())?;
        self.execute(endpoint.name, &url, ctx).await
    }

    /// Logs in with the configured credentials on behalf of `operation`.
    ///
    /// `expired` is the session-expiry error when this is a refresh.
    async fn reauthenticate(
        &self,
        operation: &'static str,
        expired: Option<ClientError>,
        ctx: &CallContext,
    ) -> Result<Session, ClientError> {
        let refreshing = expired.is_some();
        let Some(credentials) = self.credentials.as_ref() else {
            let reason = if refreshing {
                "session expired and no credentials are configured"
            } else {
                "no session and no credentials are configured"
            };
            return Err(ClientError::authentication(operation, reason, expired));
        };

        self.fetch_session(credentials, ctx)
            .await
            .map_err(|e| login_failure(operation, e, refreshing))
    }
}

/// Turns a failed login into [`ClientError::Authentication`].
///
/// Cancellation passes through unchanged so callers can tell an abort from a
/// rejected login.
pub(super) fn login_failure(operation: &'static str, e: ClientError, refreshing: bool) -> ClientError {
    if matches!(e, ClientError::Cancelled { .. }) {
        return e;
    }

    warn!(name = operation, error = %e, refreshing, "login failed");
    let reason = if refreshing {
        format!("session expired (code 105) and login failed: {e}")
    } else {
        format!("login failed: {e}")
    };
    ClientError::authentication(operation, reason, Some(e))
}
