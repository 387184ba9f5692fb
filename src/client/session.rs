//! In-memory session id slot shared by the operations of one client.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// A Download Station session id (SID).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(String);

impl Session {
    /// Wraps a session id issued by the server.
    pub fn new(sid: impl Into<String>) -> Self {
        Self(sid.into())
    }

    /// The raw session id.
    #[must_use]
    pub fn sid(&self) -> &str {
        &self.0
    }
}

// SIDs are bearer tokens; keep them out of debug logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Session").field(&"***").finish()
    }
}

/// Single-slot, last-write-wins session holder.
///
/// Reads and writes go through an `RwLock`, so concurrent operations of the
/// same client can share one store. A poisoned lock still yields the last
/// value written; the slot holds plain data that cannot be left half-updated.
#[derive(Debug, Default)]
pub struct SessionStore {
    slot: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current session, if any.
    #[must_use]
    pub fn get(&self) -> Option<Session> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current session.
    pub fn set(&self, session: Session) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Forgets the current session.
    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
