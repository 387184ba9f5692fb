//! Downtown Core Library
//!
//! Client for the Synology Download Station web API, used by the downtown
//! control panel to list, create, pause, resume and delete download tasks.
//!
//! # Architecture
//!
//! - [`client`] - envelope decoding, request building, transport, session
//!   handling and the [`DsClient`] facade
//! - [`config`] - environment-sourced client configuration
//!
//! Rendering (HTML, byte-size formatting) and cookie storage belong to the
//! caller; the client only hands out plain data and session ids.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;

// Re-export commonly used types
pub use client::{
    ApiOrigin, CallContext, ClientError, Credentials, DsClient, HttpTransport,
    SESSION_EXPIRED_CODE, Session, Task, TaskChange, TaskCollection, Transport,
};
pub use config::{ClientConfig, ConfigError};
