//! Per-instrument quoting configuration.

use quoter_core::{base_currency, CoreError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_period_secs() -> u64 {
    10
}

fn default_depth_tag() -> String {
    "L20".to_string()
}

/// Configuration for a single quoted instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Venue symbol, e.g. `btcusdt`. The quote currency suffix determines
    /// which balances are consulted when sizing orders.
    pub symbol: String,
    /// Upper bound on the quote-currency notional committed per order.
    pub balance_cap: Decimal,
    /// Minimum quote-currency balance required before placing a buy.
    pub min_balance: Decimal,
    /// Minimum base-asset balance required before placing a sell.
    pub min_asset: Decimal,
    /// Decimal places the venue accepts for order amounts.
    pub asset_precision: u32,
    /// Decimal places the venue accepts for order prices.
    pub price_precision: u32,
    /// Seconds between the end of one tick and the start of the next.
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
    /// When set, only the sell side is quoted.
    #[serde(default)]
    pub one_sided: bool,
    /// Depth channel tag requested from the venue.
    #[serde(default = "default_depth_tag")]
    pub depth_tag: String,
    pub strategy: StrategyConfig,
}

/// Quoting strategy and its parameters, tagged by `kind` in config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Quote at fixed book levels, re-quoting every tick.
    Level { buy_level: usize, sell_level: usize },
    /// Quote at fixed book levels, leaving resting orders alone while they
    /// stay inside the band spanned by `low_level` and `high_level`.
    BandedLevel {
        buy_level: usize,
        sell_level: usize,
        low_level: usize,
        high_level: usize,
    },
    /// Quote at fixed rate offsets from the last traded price, re-quoting
    /// every tick.
    Offset {
        diff_buy_rate: Decimal,
        diff_sell_rate: Decimal,
    },
    /// Quote at rate offsets from the last traded price, leaving resting
    /// orders alone while they stay inside the `[min_rate, max_rate]` band.
    PassiveBand {
        min_rate: Decimal,
        mid_rate: Decimal,
        max_rate: Decimal,
    },
}

impl InstrumentConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if base_currency(&self.symbol).is_none() {
            return Err(CoreError::InvalidSymbol(self.symbol.clone()));
        }
        if self.balance_cap <= Decimal::ZERO {
            return Err(CoreError::InvalidConfig(format!(
                "{}: balance_cap must be positive",
                self.symbol
            )));
        }
        if self.period_secs == 0 {
            return Err(CoreError::InvalidConfig(format!(
                "{}: period_secs must be at least 1",
                self.symbol
            )));
        }
        if self.asset_precision > 18 || self.price_precision > 18 {
            return Err(CoreError::InvalidConfig(format!(
                "{}: precision must not exceed 18 decimal places",
                self.symbol
            )));
        }
        self.strategy.validate(&self.symbol)
    }
}

impl StrategyConfig {
    fn validate(&self, symbol: &str) -> Result<(), CoreError> {
        let bad = |msg: &str| CoreError::InvalidConfig(format!("{symbol}: {msg}"));
        match self {
            Self::Level {
                buy_level,
                sell_level,
            } => {
                if *buy_level == 0 || *sell_level == 0 {
                    return Err(bad("book levels are 1-based and must be at least 1"));
                }
            }
            Self::BandedLevel {
                buy_level,
                sell_level,
                low_level,
                high_level,
            } => {
                if *buy_level == 0 || *sell_level == 0 || *low_level == 0 || *high_level == 0 {
                    return Err(bad("book levels are 1-based and must be at least 1"));
                }
                if low_level >= high_level {
                    return Err(bad("low_level must be below high_level"));
                }
            }
            Self::Offset {
                diff_buy_rate,
                diff_sell_rate,
            } => {
                for rate in [diff_buy_rate, diff_sell_rate] {
                    if *rate <= Decimal::ZERO || *rate >= Decimal::ONE {
                        return Err(bad("offset rates must be in (0, 1)"));
                    }
                }
            }
            Self::PassiveBand {
                min_rate,
                mid_rate,
                max_rate,
            } => {
                for rate in [min_rate, mid_rate, max_rate] {
                    if *rate <= Decimal::ZERO || *rate >= Decimal::ONE {
                        return Err(bad("band rates must be in (0, 1)"));
                    }
                }
                if min_rate >= max_rate {
                    return Err(bad("min_rate must be below max_rate"));
                }
            }
        }
        Ok(())
    }

    /// Strategy kind as it appears in config files, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Level { .. } => "level",
            Self::BandedLevel { .. } => "banded_level",
            Self::Offset { .. } => "offset",
            Self::PassiveBand { .. } => "passive_band",
        }
    }
}
