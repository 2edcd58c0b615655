//! Order-related types: side, type, exchange order identifier, and the
//! per-side resting order slot contents.

use crate::{Price, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type. The quoting engine only ever submits limit orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "limit"),
            Self::Market => write!(f, "market"),
        }
    }
}

/// Opaque exchange-assigned order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A submitted limit order that is resting on the book.
///
/// Each instrument holds at most one of these per side; the slot is
/// cleared when the order is cancelled or confirmed filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestingOrder {
    /// Exchange order identifier.
    pub id: OrderId,
    /// Side the order rests on.
    pub side: OrderSide,
    /// Quoted price.
    pub price: Price,
    /// Quoted size.
    pub size: Size,
}

impl RestingOrder {
    pub fn new(id: OrderId, side: OrderSide, price: Price, size: Size) -> Self {
        Self {
            id,
            side,
            price,
            size,
        }
    }
}

impl fmt::Display for RestingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} @ {} (id={})",
            self.side, self.size, self.price, self.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn test_order_side_serde_lowercase() {
        assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), "\"buy\"");
        let side: OrderSide = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(side, OrderSide::Sell);
    }

    #[test]
    fn test_order_id_transparent_serde() {
        let id = OrderId::new("9d17a03b852e48c0");
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"9d17a03b852e48c0\""
        );
    }
}
