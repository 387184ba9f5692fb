//! Authenticated client for the Download Station web API.
//!
//! Every call is an HTTPS GET whose response is wrapped in the same
//! `{success, error: {code}, data}` envelope. Authenticated calls carry a
//! session id (`_sid`) obtained from `SYNO.API.Auth`; the client logs in
//! lazily and, when the server reports the session as expired (code 105),
//! logs in again and retries the call once.
//!
//! # Example
//!
//! ```no_run
//! use downtown_core::{CallContext, ClientConfig, DsClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let client = DsClient::new(&config)?;
//! let ctx = CallContext::new(config.call_timeout);
//! for task in client.list_tasks(&ctx).await?.tasks {
//!     println!("{} {}", task.id, task.title);
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod context;
mod envelope;
mod error;
pub mod request;
mod session;
#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod testing;
mod transport;
mod types;

use std::sync::Arc;

use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{info, instrument};
use url::Url;

use crate::config::ClientConfig;

pub use context::{CallContext, DEFAULT_CALL_TIMEOUT_SECS};
pub use envelope::{Envelope, EnvelopeError, decode};
pub use error::{ClientError, SESSION_EXPIRED_CODE};
pub use request::{ApiOrigin, Endpoint};
pub use session::{Session, SessionStore};
pub use transport::{DEFAULT_CONNECT_TIMEOUT_SECS, HttpTransport, Transport};
pub use types::{Credentials, Task, TaskChange, TaskCollection};

use request::{CREATE_TASK, DELETE_TASK, LIST_TASKS, LOGIN, PAUSE_TASK, RESUME_TASK};
use types::LoginData;

/// Download Station API client.
///
/// Owns its session store; separate instances never share a session. The
/// client is `Send + Sync` and can be shared behind an `Arc` by concurrent
/// request handlers.
pub struct DsClient {
    origin: ApiOrigin,
    transport: Arc<dyn Transport>,
    sessions: SessionStore,
    credentials: Option<Credentials>,
}

impl std::fmt::Debug for DsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DsClient")
            .field("origin", &self.origin)
            .field("session", &self.sessions.get())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl DsClient {
    /// Creates a client from configuration, using the reqwest transport.
    ///
    /// Configured credentials enable transparent login and session refresh.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.connect_timeout)?;
        let client = Self::with_transport(config.origin.clone(), Arc::new(transport));
        Ok(match &config.credentials {
            Some(credentials) => client.with_credentials(credentials.clone()),
            None => client,
        })
    }

    /// Creates a client over an arbitrary transport.
    #[must_use]
    pub fn with_transport(origin: ApiOrigin, transport: Arc<dyn Transport>) -> Self {
        Self {
            origin,
            transport,
            sessions: SessionStore::new(),
            credentials: None,
        }
    }

    /// Sets the credentials used when an authenticated call needs a session.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// API origin this client talks to.
    #[must_use]
    pub fn origin(&self) -> &ApiOrigin {
        &self.origin
    }

    /// The current session, if one has been established.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.sessions.get()
    }

    /// Adopts a session obtained elsewhere, e.g. read back from a cookie.
    pub fn restore_session(&self, session: Session) {
        self.sessions.set(session);
    }

    /// Forgets the current session locally. The server is not contacted.
    pub fn logout(&self) {
        self.sessions.clear();
    }

    /// Logs in and stores the resulting session.
    ///
    /// The credentials are used for this call only.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] wrapping the underlying
    /// failure, or [`ClientError::Cancelled`] when `ctx` is cancelled.
    #[instrument(skip(self, credentials, ctx), fields(user = credentials.username()))]
    pub async fn login(
        &self,
        credentials: &Credentials,
        ctx: &CallContext,
    ) -> Result<Session, ClientError> {
        let session = self
            .fetch_session(credentials, ctx)
            .await
            .map_err(|e| auth::login_failure(LOGIN.name, e, false))?;
        self.sessions.set(session.clone());
        info!("Logged in");
        Ok(session)
    }

    /// Lists tasks with their transfer statistics.
    ///
    /// # Errors
    ///
    /// See [`ClientError`]; session expiry is handled internally once.
    #[instrument(skip(self, ctx))]
    pub async fn list_tasks(&self, ctx: &CallContext) -> Result<TaskCollection, ClientError> {
        self.authenticated(LIST_TASKS, &[], ctx).await
    }

    /// Creates a download task from a URL or magnet link.
    ///
    /// The server returns no task id; success means the task was queued.
    ///
    /// # Errors
    ///
    /// See [`ClientError`].
    #[instrument(skip(self, ctx))]
    pub async fn create_task(&self, uri: &str, ctx: &CallContext) -> Result<(), ClientError> {
        let _: IgnoredAny = self.authenticated(CREATE_TASK, &[uri], ctx).await?;
        info!("Task created");
        Ok(())
    }

    /// Pauses a task.
    ///
    /// # Errors
    ///
    /// [`ClientError::TaskRejected`] when the server refuses the task, plus
    /// the errors of any authenticated call.
    #[instrument(skip(self, ctx))]
    pub async fn pause_task(
        &self,
        id: &str,
        ctx: &CallContext,
    ) -> Result<Vec<TaskChange>, ClientError> {
        self.change_task(PAUSE_TASK, id, ctx).await
    }

    /// Resumes a paused task.
    ///
    /// # Errors
    ///
    /// Same as [`pause_task`](Self::pause_task).
    #[instrument(skip(self, ctx))]
    pub async fn resume_task(
        &self,
        id: &str,
        ctx: &CallContext,
    ) -> Result<Vec<TaskChange>, ClientError> {
        self.change_task(RESUME_TASK, id, ctx).await
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Same as [`pause_task`](Self::pause_task).
    #[instrument(skip(self, ctx))]
    pub async fn delete_task(
        &self,
        id: &str,
        ctx: &CallContext,
    ) -> Result<Vec<TaskChange>, ClientError> {
        self.change_task(DELETE_TASK, id, ctx).await
    }

    // Task batch endpoints report per-task errors inside a successful envelope.
    async fn change_task(
        &self,
        endpoint: Endpoint,
        id: &str,
        ctx: &CallContext,
    ) -> Result<Vec<TaskChange>, ClientError> {
        let changes: Option<Vec<TaskChange>> = self.authenticated(endpoint, &[id], ctx).await?;
        let changes = changes.unwrap_or_default();

        if let Some(rejected) = changes.iter().find(|change| change.error != 0) {
            return Err(ClientError::TaskRejected {
                operation: endpoint.name,
                id: rejected.id.clone(),
                code: rejected.error,
            });
        }
        info!(name = endpoint.name, id, "Task updated");
        Ok(changes)
    }

    /// Performs the login call without touching the session store.
    async fn fetch_session(
        &self,
        credentials: &Credentials,
        ctx: &CallContext,
    ) -> Result<Session, ClientError> {
        let url = request::build(
            &self.origin,
            LOGIN,
            &[credentials.username(), credentials.secret()],
        )?;
        let data: LoginData = self.execute(LOGIN.name, &url, ctx).await?;
        Ok(Session::new(data.sid))
    }

    /// One transport round trip plus envelope decoding, bounded by `ctx`.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: &Url,
        ctx: &CallContext,
    ) -> Result<T, ClientError> {
        ctx.run(operation, async {
            let body = self.transport.get(operation, url, ctx.timeout()).await?;
            decode(operation, &body)
        })
        .await
    }
}
