mod alerts;
mod anomaly;
mod config;
mod dashboard;
mod favorites;
mod feeds;
mod model;
mod orbit;
mod refresh;
mod search;
#[cfg(test)]
mod test_support;
mod web;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;

use crate::config::Config;
use crate::feeds::{build_client, CatalogFeed, Feed, JsonClient, PassFeed, SignalFeed, SourceKind};

#[derive(Parser)]
#[command(name = "space-radar")]
#[command(about = "Satellite catalog, radio signal and visible pass dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard API server
    Serve {
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Validate a config file
    Validate { config: String },
    /// Fetch one source once and print its records as JSON
    Fetch {
        source: SourceKind,
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()).await,
        Commands::Validate { config } => validate(&config),
        Commands::Fetch { source, config } => fetch(source, config.as_deref()).await,
    }
}

fn load_config(path: Option<&str>) -> Option<Config> {
    let loaded = match path {
        Some(path) => Config::from_file(path),
        None => Config::from_str(""),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Config error: {}", e);
            None
        }
    }
}

async fn serve(path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load_config(Some(path)) else {
        return ExitCode::FAILURE;
    };

    println!("Config is valid");
    for source in SourceKind::ALL {
        let source_config = config.sources.get(source);
        println!(
            "  {}: {} every {}",
            source,
            source_config.url,
            humantime::format_duration(source_config.interval)
        );
    }
    let band = config.anomaly.band();
    println!("  nominal band: {} - {} MHz", band.low_mhz, band.high_mhz);
    ExitCode::SUCCESS
}

async fn fetch(source: SourceKind, path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let http = match build_client(&config.http) {
        Ok(http) => http,
        Err(e) => {
            eprintln!("HTTP client error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let client = JsonClient::new(http, &config.sources.get(source).url);

    match source {
        SourceKind::Catalog => print_records(CatalogFeed::new(client)).await,
        SourceKind::Signals => print_records(SignalFeed::new(client)).await,
        SourceKind::Passes => print_records(PassFeed::new(client)).await,
    }
}

async fn print_records<F>(feed: F) -> ExitCode
where
    F: Feed,
    F::Record: Serialize,
{
    let records = match feed.fetch().await {
        Ok(records) => {
            log::info!("Fetched {} records", records.len());
            records
        }
        Err(e) => {
            eprintln!("Fetch failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&records) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Encode failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
