//! Client configuration sourced from the process environment.
//!
//! | Variable                               | Required | Default |
//! |----------------------------------------|----------|---------|
//! | `DOWNLOAD_STATION_HOST`                | yes      |         |
//! | `DOWNLOAD_STATION_SCHEME`              | no       | `https` |
//! | `DOWNLOAD_STATION_USER`                | no       |         |
//! | `DOWNLOAD_STATION_PASSWORD`            | no       |         |
//! | `DOWNLOAD_STATION_TIMEOUT_SECS`        | no       | `30`    |
//! | `DOWNLOAD_STATION_CONNECT_TIMEOUT_SECS`| no       | `10`    |
//!
//! User and password must be set together; with them the client can log in
//! on its own and refresh expired sessions.

use std::time::Duration;

use thiserror::Error;

use crate::client::{
    ApiOrigin, Credentials, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS,
};

/// Remote API host (`host[:port]` or full origin).
pub const HOST_VAR: &str = "DOWNLOAD_STATION_HOST";
/// Scheme used when the host has none.
pub const SCHEME_VAR: &str = "DOWNLOAD_STATION_SCHEME";
/// Account used for automatic login.
pub const USER_VAR: &str = "DOWNLOAD_STATION_USER";
/// Password used for automatic login.
pub const PASSWORD_VAR: &str = "DOWNLOAD_STATION_PASSWORD";
/// Per-call timeout in seconds.
pub const TIMEOUT_VAR: &str = "DOWNLOAD_STATION_TIMEOUT_SECS";
/// Connect timeout in seconds.
pub const CONNECT_TIMEOUT_VAR: &str = "DOWNLOAD_STATION_CONNECT_TIMEOUT_SECS";

const DEFAULT_SCHEME: &str = "https";
const MAX_TIMEOUT_SECS: u64 = 600;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("environment variable {name} not set")]
    Missing {
        /// Variable name.
        name: &'static str,
    },

    /// A variable is set to an unusable value.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Settings needed to build a [`DsClient`](crate::DsClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Where the API lives.
    pub origin: ApiOrigin,
    /// Credentials for automatic login, when configured.
    pub credentials: Option<Credentials>,
    /// Bound on each transport call.
    pub call_timeout: Duration,
    /// Bound on establishing a connection.
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the host is missing or any value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = get(HOST_VAR).ok_or(ConfigError::Missing { name: HOST_VAR })?;
        let scheme = get(SCHEME_VAR).unwrap_or_else(|| DEFAULT_SCHEME.to_string());
        let origin = ApiOrigin::parse(&host, &scheme).map_err(|reason| ConfigError::Invalid {
            name: HOST_VAR,
            reason,
        })?;

        // Passwords are taken verbatim; only emptiness is checked.
        let password = lookup(PASSWORD_VAR).filter(|value| !value.is_empty());
        let credentials = match (get(USER_VAR), password) {
            (Some(user), Some(password)) => Some(Credentials::new(user, password)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing { name: PASSWORD_VAR }),
            (None, Some(_)) => return Err(ConfigError::Missing { name: USER_VAR }),
        };

        let call_timeout = parse_timeout(TIMEOUT_VAR, get(TIMEOUT_VAR), DEFAULT_CALL_TIMEOUT_SECS)?;
        let connect_timeout = parse_timeout(
            CONNECT_TIMEOUT_VAR,
            get(CONNECT_TIMEOUT_VAR),
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?;

        Ok(Self {
            origin,
            credentials,
            call_timeout,
            connect_timeout,
        })
    }
}

fn parse_timeout(
    name: &'static str,
    value: Option<String>,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(default_secs));
    };
    let secs: u64 = value.parse().map_err(|_| ConfigError::Invalid {
        name,
        reason: format!("'{value}' is not a whole number of seconds"),
    })?;
    if !(1..=MAX_TIMEOUT_SECS).contains(&secs) {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("{secs} is outside 1..={MAX_TIMEOUT_SECS}"),
        });
    }
    Ok(Duration::from_secs(secs))
}
