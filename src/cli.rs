//! CLI argument definitions using clap derive macros.

use clap::{Parser, Subcommand};

/// Manage Download Station tasks from the command line.
///
/// Connection settings come from the environment (`DOWNLOAD_STATION_HOST`,
/// `DOWNLOAD_STATION_USER`, `DOWNLOAD_STATION_PASSWORD`, ...). Results are
/// printed as JSON.
#[derive(Parser, Debug)]
#[command(name = "downtown")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Reuse an existing session id instead of logging in first
    #[arg(long, global = true)]
    pub sid: Option<String>,

    /// Per-request timeout in seconds (1-600), overrides the environment
    #[arg(short = 't', long, global = true, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations against the Download Station.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in with the configured credentials and print the session id
    Login,
    /// List download tasks
    Tasks,
    /// Create a task from a URL or magnet link
    Add {
        /// URL or magnet link to download
        uri: String,
    },
    /// Pause a task
    Pause {
        /// Task id, e.g. dbid_123
        id: String,
    },
    /// Resume a paused task
    Resume {
        /// Task id, e.g. dbid_123
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task id, e.g. dbid_123
        id: String,
    },
}
