//! CLI entry point for the downtown tool.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use downtown_core::{CallContext, ClientConfig, DsClient, Session};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries JSON results only.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(command = ?args.command, "CLI arguments parsed");

    let mut config = ClientConfig::from_env().context("loading configuration")?;
    if let Some(timeout) = args.timeout {
        config.call_timeout = Duration::from_secs(timeout);
    }
    info!(origin = %config.origin, "Downtown starting");

    let client = DsClient::new(&config).context("creating Download Station client")?;
    if let Some(sid) = args.sid {
        client.restore_session(Session::new(sid));
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });
    let ctx = CallContext::with_cancellation(config.call_timeout, cancel);

    match args.command {
        Command::Login => {
            let credentials = config.credentials.as_ref().context(
                "DOWNLOAD_STATION_USER and DOWNLOAD_STATION_PASSWORD must be set to log in",
            )?;
            let session = client.login(credentials, &ctx).await?;
            print_json(&serde_json::json!({ "sid": session.sid() }))?;
        }
        Command::Tasks => {
            let tasks = client.list_tasks(&ctx).await?;
            info!(total = tasks.total, "Listed tasks");
            print_json(&tasks)?;
        }
        Command::Add { uri } => {
            client.create_task(&uri, &ctx).await?;
            print_json(&serde_json::json!({ "created": uri }))?;
        }
        Command::Pause { id } => print_json(&client.pause_task(&id, &ctx).await?)?,
        Command::Resume { id } => print_json(&client.resume_task(&id, &ctx).await?)?,
        Command::Delete { id } => print_json(&client.delete_task(&id, &ctx).await?)?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("rendering output")?;
    println!("{rendered}");
    Ok(())
}
