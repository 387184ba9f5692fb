//! Payload types exchanged with the Download Station task API.
//!
//! Tasks arrive with their transfer counters nested under
//! `additional.transfer`; [`Task`] flattens them so renderers get one plain
//! record per task.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Username and password for `SYNO.API.Auth`.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    secret: String,
}

impl Credentials {
    /// Creates credentials for one login call.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Account name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"***")
            .finish()
    }
}

/// Login payload. The device id and portal flag that come with it are ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginData {
    pub(crate) sid: String,
}

/// A download task snapshot as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskData")]
pub struct Task {
    /// Server-assigned id, e.g. `dbid_123`.
    pub id: String,
    /// Display name.
    pub title: String,
    /// Transfer kind (`bt`, `http`, `ftp`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Server status string (`downloading`, `paused`, `finished`, ...).
    pub status: String,
    /// Total size in bytes.
    pub size: u64,
    /// Owner of the task.
    pub username: String,
    /// Bytes downloaded so far.
    pub downloaded_bytes: u64,
    /// Bytes uploaded so far.
    pub uploaded_bytes: u64,
    /// Current download speed, bytes per second.
    pub download_speed: u64,
    /// Current upload speed, bytes per second.
    pub upload_speed: u64,
}

/// One page of tasks, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCollection {
    /// Index of the first task in this page.
    #[serde(default)]
    pub offset: u64,
    /// Total number of tasks on the server.
    #[serde(default)]
    pub total: u64,
    /// The tasks.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Per-task outcome of a pause, resume or delete call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChange {
    /// Task id.
    pub id: String,
    /// Per-task error code; zero means success.
    #[serde(default)]
    pub error: i64,
}

#[derive(Debug, Default, Deserialize)]
struct TaskData {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    username: String,
    #[serde(default)]
    additional: Additional,
    // Present when a serialized `Task` is read back.
    #[serde(default)]
    downloaded_bytes: Option<u64>,
    #[serde(default)]
    uploaded_bytes: Option<u64>,
    #[serde(default)]
    download_speed: Option<u64>,
    #[serde(default)]
    upload_speed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct Additional {
    #[serde(default)]
    transfer: Transfer,
}

#[derive(Debug, Default, Deserialize)]
struct Transfer {
    #[serde(default)]
    size_downloaded: u64,
    #[serde(default)]
    size_uploaded: u64,
    #[serde(default)]
    speed_download: u64,
    #[serde(default)]
    speed_upload: u64,
}

impl From<TaskData> for Task {
    fn from(data: TaskData) -> Self {
        let transfer = data.additional.transfer;
        Self {
            id: data.id,
            title: data.title,
            kind: data.kind,
            status: data.status,
            size: data.size,
            username: data.username,
            downloaded_bytes: data.downloaded_bytes.unwrap_or(transfer.size_downloaded),
            uploaded_bytes: data.uploaded_bytes.unwrap_or(transfer.size_uploaded),
            download_speed: data.download_speed.unwrap_or(transfer.speed_download),
            upload_speed: data.upload_speed.unwrap_or(transfer.speed_upload),
        }
    }
}
