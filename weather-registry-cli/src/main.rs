//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Wiring configuration, provider and service together
//! - Running the startup refresh and the daily background refresh
//! - Interactive configuration and human-friendly output

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries query results.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_registry=info,weather=info".into()),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
