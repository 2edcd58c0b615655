//! Passive quoting bot: configuration, logging, and orchestration.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::{credentials_from_env, AppConfig, GatewayConfig, RecorderConfig};
pub use error::{AppError, AppResult};
pub use logging::init_logging;
