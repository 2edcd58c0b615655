//! Market data snapshot types.
//!
//! A snapshot is fetched fresh each tick and never mutated: either an
//! order-book view (`Depth`) or a last-trade price (`Ticker`).

use crate::{Price, Size};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Minimum number of levels per book side for a depth snapshot to be
/// usable. The venue's L20 feed ships 30+ interleaved price/size floats
/// per side; anything shorter is treated as a truncated update.
pub const MIN_BOOK_LEVELS: usize = 15;

/// One (price, size) level of an order book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub size: Size,
}

/// Order-book view: bids sorted best-first (descending), asks best-first
/// (ascending), as delivered by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Depth {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl Depth {
    pub fn new(bids: Vec<BookLevel>, asks: Vec<BookLevel>) -> Self {
        Self { bids, asks }
    }

    /// Parse the venue's interleaved `[price, size, price, size, ...]`
    /// arrays into levels. A trailing unpaired element is discarded.
    pub fn from_interleaved(bids: &[Decimal], asks: &[Decimal]) -> Self {
        fn levels(flat: &[Decimal]) -> Vec<BookLevel> {
            flat.chunks_exact(2)
                .map(|pair| BookLevel {
                    price: Price::new(pair[0]),
                    size: Size::new(pair[1]),
                })
                .collect()
        }
        Self {
            bids: levels(bids),
            asks: levels(asks),
        }
    }

    /// Bid price at a 1-based depth level (1 = best bid).
    pub fn bid_at(&self, level: usize) -> Option<Price> {
        if level == 0 {
            return None;
        }
        self.bids.get(level - 1).map(|l| l.price)
    }

    /// Ask price at a 1-based depth level (1 = best ask).
    pub fn ask_at(&self, level: usize) -> Option<Price> {
        if level == 0 {
            return None;
        }
        self.asks.get(level - 1).map(|l| l.price)
    }

    /// Whether both sides carry enough levels to quote from.
    pub fn is_usable(&self) -> bool {
        self.bids.len() >= MIN_BOOK_LEVELS && self.asks.len() >= MIN_BOOK_LEVELS
    }
}

/// Last-trade ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticker {
    /// Price of the most recent trade.
    pub last: Price,
}

impl Ticker {
    pub fn new(last: Price) -> Self {
        Self { last }
    }

    /// A ticker with a non-positive last price carries no information.
    pub fn is_usable(&self) -> bool {
        self.last.is_positive()
    }
}

/// Market snapshot consumed by a pricing strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketSnapshot {
    /// Order-book view, for level-based strategies.
    Book(Depth),
    /// Last-trade reference price, for offset strategies.
    LastTrade(Price),
}

impl MarketSnapshot {
    /// Whether the snapshot carries enough data to act on this tick.
    pub fn is_usable(&self) -> bool {
        match self {
            Self::Book(depth) => depth.is_usable(),
            Self::LastTrade(price) => price.is_positive(),
        }
    }

    pub fn as_book(&self) -> Option<&Depth> {
        match self {
            Self::Book(depth) => Some(depth),
            Self::LastTrade(_) => None,
        }
    }

    pub fn as_last_trade(&self) -> Option<Price> {
        match self {
            Self::Book(_) => None,
            Self::LastTrade(price) => Some(*price),
        }
    }
}
