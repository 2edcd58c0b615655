//! Fill bookkeeping record.

use crate::{OrderId, Price, Size};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A confirmed fill, built from the exchange's order-detail lookup after a
/// cancel attempt came back "already filled". Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRecord {
    /// Exchange order identifier.
    pub order_id: OrderId,
    /// Traded symbol.
    pub symbol: String,
    /// Order side as reported by the exchange.
    pub side: String,
    /// Order type as reported by the exchange.
    pub order_type: String,
    /// Limit price the order executed at.
    pub price: Price,
    /// Executed amount.
    pub amount: Size,
    /// Terminal order state string (e.g. "filled").
    pub state: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for FillRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "symbol:{},price:{},amount:{},side:{}",
            self.symbol, self.price, self.amount, self.side
        )
    }
}
