//! Request/response types crossing the gateway boundary.

use quoter_core::{OrderId, OrderSide, OrderType, Price, Size};
use serde::{Deserialize, Serialize};

/// A new limit order to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: rust_decimal::Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: rust_decimal::Decimal,
}

impl NewOrderRequest {
    /// Limit order for `symbol`. Prices and sizes are sent as strings so
    /// the venue never sees float noise.
    pub fn limit(symbol: impl Into<String>, side: OrderSide, price: Price, amount: Size) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            price: price.inner(),
            amount: amount.inner(),
        }
    }
}

/// Acknowledgement of a successfully created order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAck {
    /// Exchange-assigned identifier of the new order.
    pub order_id: OrderId,
}

/// Terminal outcome of a cancel request.
///
/// Any other venue status surfaces as `GatewayError::Rejected` and leaves
/// the caller's order slot untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Order was resting and is now cancelled.
    Cancelled,
    /// Cancel was refused because the order had already fully executed.
    /// Not an error: this is how fills are detected.
    AlreadyFilled,
}

/// Order detail as reported by the venue's order lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderDetail {
    #[serde(rename = "id")]
    pub order_id: OrderId,
    pub symbol: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: rust_decimal::Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: rust_decimal::Decimal,
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_order_serializes_decimals_as_strings() {
        let req = NewOrderRequest::limit(
            "btcusdt",
            OrderSide::Buy,
            Price::new(dec!(9232.1)),
            Size::new(dec!(0.0108)),
        );
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"price\":\"9232.1\""));
        assert!(json.contains("\"amount\":\"0.0108\""));
        assert!(json.contains("\"side\":\"buy\""));
        assert!(json.contains("\"type\":\"limit\""));
    }

    #[test]
    fn test_order_detail_deserialization() {
        let json = r#"{
            "id": "9d17a03b852e48c0",
            "symbol": "btcusdt",
            "type": "limit",
            "side": "sell",
            "price": "9010.0",
            "amount": "0.5",
            "state": "filled"
        }"#;
        let detail: OrderDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.order_id.as_str(), "9d17a03b852e48c0");
        assert_eq!(detail.price, dec!(9010.0));
        assert_eq!(detail.state, "filled");
    }
}
