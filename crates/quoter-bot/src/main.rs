//! Passive quoting bot entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Passive limit-order quoting bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via QUOTER_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    quoter_bot::init_logging();

    info!("Starting quoter-bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > QUOTER_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("QUOTER_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = quoter_bot::AppConfig::from_file(&config_path)?;
    info!(
        instruments = config.instruments.len(),
        base_url = %config.gateway.base_url,
        "Configuration loaded"
    );

    let credentials = quoter_bot::credentials_from_env()?;
    let app = quoter_bot::Application::new(config, credentials)?;
    app.run().await?;

    Ok(())
}
