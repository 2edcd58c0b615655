//! Quoting engine: per-instrument tick loops, pricing strategies, and
//! resting-order lifecycle.

pub mod config;
pub mod engine;
pub mod strategy;

pub use config::{InstrumentConfig, StrategyConfig};
pub use engine::{QuoteEngine, FILL_QUEUE_CAPACITY};
pub use strategy::buy_size;
