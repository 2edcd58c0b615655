//! Pure quoting math: target prices, cancel predicates, and order sizing.
//!
//! Everything here is a function of a market snapshot and the strategy
//! parameters; no I/O and no engine state, so each rule is testable on
//! its own.

use crate::config::StrategyConfig;
use quoter_core::{MarketSnapshot, OrderSide, Price, Size};
use rust_decimal::Decimal;

impl StrategyConfig {
    /// Whether the strategy prices off the order book (as opposed to the
    /// last-trade ticker).
    pub fn needs_book(&self) -> bool {
        matches!(self, Self::Level { .. } | Self::BandedLevel { .. })
    }

    /// Whether resting orders survive across ticks. Persistent strategies
    /// consult the cancel predicate against fresh market data before
    /// pulling an order; the rest re-quote every tick.
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::BandedLevel { .. } | Self::PassiveBand { .. })
    }

    /// Target price for a new buy order, or `None` when the snapshot is
    /// missing the data the strategy needs.
    pub fn buy_price(&self, snapshot: &MarketSnapshot, price_precision: u32) -> Option<Price> {
        match self {
            Self::Level { buy_level, .. } | Self::BandedLevel { buy_level, .. } => {
                snapshot.as_book()?.bid_at(*buy_level)
            }
            Self::Offset { diff_buy_rate, .. } => {
                let last = snapshot.as_last_trade()?;
                Some((last * (Decimal::ONE - diff_buy_rate)).round_dp(price_precision))
            }
            Self::PassiveBand { max_rate, .. } => {
                let last = snapshot.as_last_trade()?.round_dp(price_precision);
                Some((last * (Decimal::ONE - max_rate)).round_dp(price_precision))
            }
        }
    }

    /// Target price for a new sell order, or `None` when the snapshot is
    /// missing the data the strategy needs.
    pub fn sell_price(&self, snapshot: &MarketSnapshot, price_precision: u32) -> Option<Price> {
        match self {
            Self::Level { sell_level, .. } | Self::BandedLevel { sell_level, .. } => {
                snapshot.as_book()?.ask_at(*sell_level)
            }
            Self::Offset { diff_sell_rate, .. } => {
                let last = snapshot.as_last_trade()?;
                Some((last * (Decimal::ONE + diff_sell_rate)).round_dp(price_precision))
            }
            Self::PassiveBand { mid_rate, .. } => {
                let last = snapshot.as_last_trade()?.round_dp(price_precision);
                Some((last * (Decimal::ONE + mid_rate)).round_dp(price_precision))
            }
        }
    }

    /// Whether a resting order at `resting_price` should be pulled this
    /// tick. Non-persistent strategies always say yes; persistent ones
    /// keep the order while it sits inside their band.
    pub fn should_cancel(
        &self,
        side: OrderSide,
        resting_price: Price,
        snapshot: Option<&MarketSnapshot>,
        price_precision: u32,
    ) -> bool {
        match self {
            Self::Level { .. } | Self::Offset { .. } => true,
            Self::BandedLevel {
                low_level,
                high_level,
                ..
            } => {
                let Some(book) = snapshot.and_then(MarketSnapshot::as_book) else {
                    return true;
                };
                // Band bounds are read from the opposing side of the book.
                match side {
                    OrderSide::Buy => {
                        let (Some(high), Some(low)) =
                            (book.ask_at(*high_level), book.ask_at(*low_level))
                        else {
                            return true;
                        };
                        high >= resting_price || low <= resting_price
                    }
                    OrderSide::Sell => {
                        let (Some(high), Some(low)) =
                            (book.bid_at(*high_level), book.bid_at(*low_level))
                        else {
                            return true;
                        };
                        high <= resting_price || low >= resting_price
                    }
                }
            }
            Self::PassiveBand {
                min_rate, max_rate, ..
            } => {
                let Some(last) = snapshot.and_then(MarketSnapshot::as_last_trade) else {
                    return true;
                };
                let last = last.round_dp(price_precision);
                match side {
                    OrderSide::Buy => {
                        resting_price > last * (Decimal::ONE - min_rate)
                            || resting_price < last * (Decimal::ONE - max_rate)
                    }
                    OrderSide::Sell => {
                        last * (Decimal::ONE + min_rate) > resting_price
                            || last * (Decimal::ONE + max_rate) < resting_price
                    }
                }
            }
        }
    }

    /// Size for a new sell order given the available base-asset balance.
    ///
    /// The offset strategy additionally caps the sell notional at
    /// `balance_cap`, mirroring how the buy side is sized; the others
    /// offer the full available balance.
    pub fn sell_size(
        &self,
        available: Decimal,
        balance_cap: Decimal,
        sell_price: Price,
        asset_precision: u32,
    ) -> Size {
        let raw = match self {
            Self::Offset { .. } => (balance_cap / sell_price.inner()).min(available),
            _ => available,
        };
        Size::new(raw).floor_dp(asset_precision)
    }
}

/// Size for a new buy order: the usable quote balance converted at the
/// order price, floored to the venue's amount precision.
pub fn buy_size(usable_balance: Decimal, buy_price: Price, asset_precision: u32) -> Size {
    Size::new(usable_balance / buy_price.inner()).floor_dp(asset_precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quoter_core::Depth;
    use rust_decimal_macros::dec;

    fn book(bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> MarketSnapshot {
        fn flat(levels: &[(Decimal, Decimal)]) -> Vec<Decimal> {
            levels.iter().flat_map(|&(p, s)| [p, s]).collect()
        }
        MarketSnapshot::Book(Depth::from_interleaved(&flat(bids), &flat(asks)))
    }

    #[test]
    fn level_prices_come_from_the_book_verbatim() {
        let strategy = StrategyConfig::Level {
            buy_level: 1,
            sell_level: 2,
        };
        let snap = book(
            &[(dec!(9000), dec!(1)), (dec!(8990), dec!(2))],
            &[(dec!(9010), dec!(1)), (dec!(9020.123), dec!(2))],
        );
        assert_eq!(strategy.buy_price(&snap, 2), Some(Price::new(dec!(9000))));
        // book prices are never re-rounded
        assert_eq!(
            strategy.sell_price(&snap, 2),
            Some(Price::new(dec!(9020.123)))
        );
    }

    #[test]
    fn level_price_none_when_book_too_shallow() {
        let strategy = StrategyConfig::Level {
            buy_level: 5,
            sell_level: 1,
        };
        let snap = book(&[(dec!(9000), dec!(1))], &[(dec!(9010), dec!(1))]);
        assert_eq!(strategy.buy_price(&snap, 2), None);
    }

    #[test]
    fn offset_prices_round_half_up() {
        let strategy = StrategyConfig::Offset {
            diff_buy_rate: dec!(0.01),
            diff_sell_rate: dec!(0.02),
        };
        let snap = MarketSnapshot::LastTrade(Price::new(dec!(100)));
        assert_eq!(strategy.buy_price(&snap, 2), Some(Price::new(dec!(99.00))));
        assert_eq!(
            strategy.sell_price(&snap, 2),
            Some(Price::new(dec!(102.00)))
        );

        // 123.456 * 0.99 = 122.22144 → 122.22; * 1.02 = 125.92512 → 125.93
        let snap = MarketSnapshot::LastTrade(Price::new(dec!(123.456)));
        assert_eq!(strategy.buy_price(&snap, 2), Some(Price::new(dec!(122.22))));
        assert_eq!(
            strategy.sell_price(&snap, 2),
            Some(Price::new(dec!(125.93)))
        );
    }

    #[test]
    fn passive_band_rounds_reference_before_offsetting() {
        let strategy = StrategyConfig::PassiveBand {
            min_rate: dec!(0.001),
            mid_rate: dec!(0.005),
            max_rate: dec!(0.01),
        };
        // reference 100.005 rounds to 100.01 first
        let snap = MarketSnapshot::LastTrade(Price::new(dec!(100.005)));
        // buy: 100.01 * 0.99 = 99.0099 → 99.01
        assert_eq!(strategy.buy_price(&snap, 2), Some(Price::new(dec!(99.01))));
        // sell: 100.01 * 1.005 = 100.51005 → 100.51
        assert_eq!(
            strategy.sell_price(&snap, 2),
            Some(Price::new(dec!(100.51)))
        );
    }

    #[test]
    fn non_persistent_strategies_always_cancel() {
        let level = StrategyConfig::Level {
            buy_level: 1,
            sell_level: 1,
        };
        let offset = StrategyConfig::Offset {
            diff_buy_rate: dec!(0.01),
            diff_sell_rate: dec!(0.01),
        };
        for strategy in [level, offset] {
            assert!(!strategy.is_persistent());
            assert!(strategy.should_cancel(OrderSide::Buy, Price::new(dec!(1)), None, 2));
            assert!(strategy.should_cancel(OrderSide::Sell, Price::new(dec!(1)), None, 2));
        }
    }

    #[test]
    fn passive_band_keeps_orders_inside_the_band() {
        let strategy = StrategyConfig::PassiveBand {
            min_rate: dec!(0.001),
            mid_rate: dec!(0.005),
            max_rate: dec!(0.01),
        };
        let snap = MarketSnapshot::LastTrade(Price::new(dec!(100)));

        // buy band is [99, 99.9]
        let inside = Price::new(dec!(99.5));
        assert!(!strategy.should_cancel(OrderSide::Buy, inside, Some(&snap), 2));
        let too_close = Price::new(dec!(99.95));
        assert!(strategy.should_cancel(OrderSide::Buy, too_close, Some(&snap), 2));
        let too_far = Price::new(dec!(98));
        assert!(strategy.should_cancel(OrderSide::Buy, too_far, Some(&snap), 2));

        // sell band is [100.1, 101]
        let inside = Price::new(dec!(100.5));
        assert!(!strategy.should_cancel(OrderSide::Sell, inside, Some(&snap), 2));
        let too_close = Price::new(dec!(100.05));
        assert!(strategy.should_cancel(OrderSide::Sell, too_close, Some(&snap), 2));
        let too_far = Price::new(dec!(102));
        assert!(strategy.should_cancel(OrderSide::Sell, too_far, Some(&snap), 2));
    }

    #[test]
    fn passive_band_cancels_when_snapshot_missing() {
        let strategy = StrategyConfig::PassiveBand {
            min_rate: dec!(0.001),
            mid_rate: dec!(0.005),
            max_rate: dec!(0.01),
        };
        assert!(strategy.should_cancel(OrderSide::Buy, Price::new(dec!(99.5)), None, 2));
    }

    #[test]
    fn banded_level_buy_predicate_compares_against_ask_bounds() {
        let strategy = StrategyConfig::BandedLevel {
            buy_level: 1,
            sell_level: 1,
            low_level: 2,
            high_level: 5,
        };
        // asks: 9010..9050; low bound = ask(2) = 9020, high bound =
        // ask(5) = 9050
        let snap = book(
            &[(dec!(9000), dec!(1))],
            &[
                (dec!(9010), dec!(1)),
                (dec!(9020), dec!(1)),
                (dec!(9030), dec!(1)),
                (dec!(9040), dec!(1)),
                (dec!(9050), dec!(1)),
            ],
        );

        // a resting buy below the ask stack trips the high bound
        // (ask(5) >= price) on every tick of an ordered book
        let resting = Price::new(dec!(9000));
        assert!(strategy.should_cancel(OrderSide::Buy, resting, Some(&snap), 2));

        // a price above the low bound trips that bound instead
        let resting = Price::new(dec!(9060));
        assert!(strategy.should_cancel(OrderSide::Buy, resting, Some(&snap), 2));
    }

    #[test]
    fn banded_level_buy_kept_only_between_inverted_bounds() {
        let strategy = StrategyConfig::BandedLevel {
            buy_level: 1,
            sell_level: 1,
            low_level: 2,
            high_level: 5,
        };
        // The keep condition requires ask(high) < price < ask(low), which
        // an ascending ask list can never satisfy; a disordered update can.
        let snap = book(
            &[(dec!(9000), dec!(1))],
            &[
                (dec!(9010), dec!(1)),
                (dec!(9100), dec!(1)),
                (dec!(9030), dec!(1)),
                (dec!(9040), dec!(1)),
                (dec!(9050), dec!(1)),
            ],
        );
        // ask(5) = 9050 < 9060 < ask(2) = 9100
        let resting = Price::new(dec!(9060));
        assert!(!strategy.should_cancel(OrderSide::Buy, resting, Some(&snap), 2));
    }

    #[test]
    fn banded_level_sell_predicate_mirrors_on_bids() {
        let strategy = StrategyConfig::BandedLevel {
            buy_level: 1,
            sell_level: 1,
            low_level: 2,
            high_level: 5,
        };
        // bids: 9000 down to 8960; low bound = bid(2) = 8990, high bound =
        // bid(5) = 8960
        let snap = book(
            &[
                (dec!(9000), dec!(1)),
                (dec!(8990), dec!(1)),
                (dec!(8980), dec!(1)),
                (dec!(8970), dec!(1)),
                (dec!(8960), dec!(1)),
            ],
            &[(dec!(9010), dec!(1))],
        );

        // a resting sell above the bid stack trips the high bound
        // (bid(5) <= price)
        let resting = Price::new(dec!(9010));
        assert!(strategy.should_cancel(OrderSide::Sell, resting, Some(&snap), 2));

        // a price below the low bound trips that bound instead
        let resting = Price::new(dec!(8950));
        assert!(strategy.should_cancel(OrderSide::Sell, resting, Some(&snap), 2));
    }

    #[test]
    fn banded_level_cancels_when_band_level_missing() {
        let strategy = StrategyConfig::BandedLevel {
            buy_level: 1,
            sell_level: 1,
            low_level: 2,
            high_level: 30,
        };
        let snap = book(&[(dec!(9000), dec!(1))], &[(dec!(9010), dec!(1))]);
        assert!(strategy.should_cancel(OrderSide::Buy, Price::new(dec!(9060)), Some(&snap), 2));
    }

    #[test]
    fn offset_sell_size_caps_notional_at_balance_cap() {
        let strategy = StrategyConfig::Offset {
            diff_buy_rate: dec!(0.01),
            diff_sell_rate: dec!(0.02),
        };
        let price = Price::new(dec!(200));
        // cap 100 at price 200 allows 0.5, below the available 3
        let size = strategy.sell_size(dec!(3), dec!(100), price, 4);
        assert_eq!(size.inner(), dec!(0.5));
        // available below the cap wins
        let size = strategy.sell_size(dec!(0.2), dec!(100), price, 4);
        assert_eq!(size.inner(), dec!(0.2));
    }

    #[test]
    fn other_strategies_sell_full_available_balance() {
        let strategy = StrategyConfig::Level {
            buy_level: 1,
            sell_level: 1,
        };
        let size = strategy.sell_size(dec!(3.12345), dec!(100), Price::new(dec!(200)), 4);
        assert_eq!(size.inner(), dec!(3.1234));
    }

    #[test]
    fn buy_size_floors_to_asset_precision() {
        let size = buy_size(dec!(100), Price::new(dec!(9216.4)), 4);
        assert_eq!(size.inner(), dec!(0.0108));
        assert!(size.notional(Price::new(dec!(9216.4))) <= dec!(100));
    }
}
