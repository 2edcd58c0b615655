//! Precision-safe decimal types for quoting.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors in price and size calculations.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Returns the quantum for `dp` fraction digits, e.g. `dp = 4` → `0.0001`.
fn quantum(dp: u32) -> Decimal {
    Decimal::new(1, dp)
}

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// prices with sizes in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Round to `dp` fraction digits, half away from zero.
    ///
    /// Used for offset-derived quote prices. Book-level prices are quoted
    /// verbatim and never pass through here.
    #[inline]
    pub fn round_dp(&self, dp: u32) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Price {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

/// Size/quantity with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Floor to `dp` fraction digits. Never rounds up, so a floored size is
    /// always affordable with the balance it was computed from.
    #[inline]
    pub fn floor_dp(&self, dp: u32) -> Self {
        let q = quantum(dp);
        Self((self.0 / q).floor() * q)
    }

    /// Notional value: size * price.
    #[inline]
    pub fn notional(&self, price: Price) -> Decimal {
        self.0 * price.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Size {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Size {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_round_dp_half_up() {
        assert_eq!(Price::new(dec!(99.005)).round_dp(2).inner(), dec!(99.01));
        assert_eq!(Price::new(dec!(99.004)).round_dp(2).inner(), dec!(99.00));
    }

    #[test]
    fn test_size_floor_dp_never_rounds_up() {
        let size = Size::new(dec!(0.0108499));
        assert_eq!(size.floor_dp(4).inner(), dec!(0.0108));

        // floor_dp(a, p) <= a for any non-negative a
        let a = Size::new(dec!(1.23456789));
        for dp in 0..8 {
            assert!(a.floor_dp(dp).inner() <= a.inner());
        }
    }

    #[test]
    fn test_size_floor_dp_exact_value_unchanged() {
        let size = Size::new(dec!(2.5000));
        assert_eq!(size.floor_dp(4).inner(), dec!(2.5));
    }

    #[test]
    fn test_balance_to_size_flooring() {
        // 100 usdt at 9216.4 → 0.010850... floored to 4 digits = 0.0108
        let balance = dec!(100);
        let price = Price::new(dec!(9216.4));
        let amt = Size::new(balance / price.inner()).floor_dp(4);
        assert_eq!(amt.inner(), dec!(0.0108));
        assert!(amt.notional(price) <= balance);
    }

    #[test]
    fn test_notional() {
        let size = Size::new(dec!(0.5));
        let price = Price::new(dec!(50000));
        assert_eq!(size.notional(price), dec!(25000));
    }
}
