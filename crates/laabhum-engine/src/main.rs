//! Laabhum order-management core - Entry Point

use anyhow::Result;
use clap::Parser;
use laabhum_engine::config::DEFAULT_CONFIG_PATH;
use std::path::Path;
use tracing::{info, warn};

/// Laabhum order-management core
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via LAABHUM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Determine config path: CLI arg > LAABHUM_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("LAABHUM_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = laabhum_engine::AppConfig::load(&config_path)?;
    laabhum_telemetry::init_logging(&config.telemetry.log_level)?;

    info!("Starting Laabhum core v{}", env!("CARGO_PKG_VERSION"));
    if Path::new(&config_path).exists() {
        info!(config_path = %config_path, "Configuration loaded");
    } else {
        warn!(config_path = %config_path, "Config file not found, using defaults");
    }

    let app = laabhum_engine::Application::new(config)?;
    app.run().await?;

    Ok(())
}
