use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use weather_registry::{
    Config, Identifier, ProviderId, WeatherReport, WeatherService,
    provider::default_provider_from_config, spawn_refresh_task,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for a growing set of locations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "weatherapi" or "openweather".
        provider: String,
    },

    /// Show weather for one or more locations.
    Show {
        /// Location ids, names, countries or "city,country" pairs.
        #[arg(required = true)]
        identifiers: Vec<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Keep the registry alive with a daily refresh and answer queries from stdin.
    ///
    /// Each input line is one query: either a JSON array such as
    /// `["new york", 1]`, or a single identifier taken verbatim.
    Serve,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { identifiers, json } => show(&identifiers, json).await,
            Command::Serve => serve().await,
        }
    }
}

fn load_config() -> Result<Config> {
    let mut config = Config::load()?;
    config.apply_env_overrides()?;
    Ok(config)
}

fn build_service(config: &Config) -> Result<Arc<WeatherService>> {
    let provider = default_provider_from_config(config)?;
    Ok(Arc::new(WeatherService::with_seeds(provider, &config.seed_locations)))
}

fn configure(provider: &str) -> Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!("Saved {id} credentials to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(raw: &[String], json: bool) -> Result<()> {
    let config = load_config()?;
    let service = build_service(&config)?;
    service.initialize().await;

    let identifiers: Vec<Identifier> = raw.iter().map(|s| Identifier::parse(s)).collect();
    let reports = service.get_weather(&identifiers).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_table(&reports);
    }
    Ok(())
}

async fn serve() -> Result<()> {
    let config = load_config()?;
    let service = build_service(&config)?;

    service.initialize().await;
    let _refresh = spawn_refresh_task(Arc::clone(&service), config.refresh_interval());

    info!("Reading queries from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match parse_query_line(&line) {
                    Ok(identifiers) if identifiers.is_empty() => continue,
                    Ok(identifiers) => println!("{}", answer(&service, &identifiers).await),
                    Err(e) => {
                        let message = format!("{e:#}");
                        warn!(error = %message, "Rejected query line");
                        println!("{}", serde_json::json!({ "status": 400, "error": message }));
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Parse one `serve` input line.
///
/// A line starting with `[` is a JSON array of identifiers. Any other
/// non-empty line is one identifier, spaces included.
fn parse_query_line(line: &str) -> Result<Vec<Identifier>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    if !line.starts_with('[') {
        return Ok(vec![Identifier::parse(line)]);
    }

    let identifiers: Vec<Identifier> =
        serde_json::from_str(line).context("Query line is not a JSON array of identifiers")?;

    Ok(identifiers
        .into_iter()
        .map(|id| match id {
            Identifier::Text(text) => Identifier::parse(&text),
            id => id,
        })
        .collect())
}

async fn answer(service: &WeatherService, identifiers: &[Identifier]) -> serde_json::Value {
    match service.get_weather(identifiers).await {
        Ok(reports) => serde_json::json!(reports),
        Err(e) => {
            warn!(error = %e, "Query failed");
            serde_json::json!({ "status": e.status_code(), "error": e.to_string() })
        }
    }
}

fn print_table(reports: &[WeatherReport]) {
    println!(
        "{:<20} {:<24} {:>7} {:<8} {:>7} {:<8} {:>6} {:<8}",
        "Name", "Country", "Temp °C", "", "Wind", "", "Cloud", ""
    );
    println!("{}", "-".repeat(96));
    for r in reports {
        println!(
            "{:<20} {:<24} {:>7.1} {:<8} {:>7.1} {:<8} {:>5}% {:<8}",
            r.name, r.country, r.temp_c, r.temp_color, r.wind_kph, r.wind_color, r.cloud, r.cloud_color
        );
    }
}
