//! Clipper - command-line entry point
//!
//! Loads configuration, wires the client and runs one command.

mod cli;
mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use clipper_application::Navigator;
use clipper_infrastructure::{ClientConfig, ClipperServices};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

/// Tells the user how to get back in once the session is gone.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn to_login(&self) {
        eprintln!("Session ended. Sign in again with `clipper login <username>`.");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }

    let services = ClipperServices::connect(&config, Arc::new(TerminalNavigator))
        .context("failed to create HTTP client")?;
    let listener = services.session.spawn_expiry_listener();

    let result = commands::run(cli.command, &services, &config).await;

    // Dropping the client closes the event channel; the listener handles
    // whatever is still queued, then stops.
    drop(services);
    if let Err(e) = listener.await {
        tracing::warn!(error = %e, "session listener failed");
    }
    result
}
