//! Application configuration.

use crate::error::{AppError, AppResult};
use quoter_engine::InstrumentConfig;
use quoter_gateway::Credentials;
use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "https://api.fcoin.com/v2".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_drain_pause_secs() -> u64 {
    5
}

/// Venue connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Fill recorder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Directory for fill .jsonl files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Pause between recorded fills, bounding the detail-lookup rate.
    #[serde(default = "default_drain_pause_secs")]
    pub drain_pause_secs: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            drain_pause_secs: default_drain_pause_secs(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    /// Instruments to quote, each with its own strategy and tick loop.
    pub instruments: Vec<InstrumentConfig>,
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.instruments.is_empty() {
            return Err(AppError::Config(
                "at least one [[instruments]] entry is required".to_string(),
            ));
        }
        for instrument in &self.instruments {
            instrument.validate()?;
        }
        Ok(())
    }
}

/// API credentials come from the environment only; they are never read
/// from or written to config files.
pub fn credentials_from_env() -> AppResult<Credentials> {
    let api_key = std::env::var("QUOTER_API_KEY")
        .map_err(|_| AppError::Config("QUOTER_API_KEY is not set".to_string()))?;
    let api_secret = std::env::var("QUOTER_API_SECRET")
        .map_err(|_| AppError::Config("QUOTER_API_SECRET is not set".to_string()))?;
    Ok(Credentials {
        api_key,
        api_secret,
    })
}
