//! Core domain types for the passive quoting bot.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Price`, `Size`: precision-safe numeric types
//! - `OrderSide`, `OrderType`, `OrderId`, `RestingOrder`: order vocabulary
//! - `Depth`, `Ticker`, `MarketSnapshot`: per-tick market data
//! - `FillRecord`: durable fill bookkeeping

pub mod decimal;
pub mod error;
pub mod fill;
pub mod market;
pub mod order;
pub mod symbol;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use fill::FillRecord;
pub use market::{BookLevel, Depth, MarketSnapshot, Ticker, MIN_BOOK_LEVELS};
pub use order::{OrderId, OrderSide, OrderType, RestingOrder};
pub use symbol::{base_currency, quote_currency};
