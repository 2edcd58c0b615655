//! Per-instrument tick loop.
//!
//! One engine owns the two resting-order slots for its instrument and
//! drives the cancel/re-quote cycle against the gateway. Instruments
//! share no mutable state; the fill channel to the recorder is the only
//! synchronization point, and it is bounded and lossy by design.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::InstrumentConfig;
use crate::strategy::buy_size;
use quoter_core::{base_currency, quote_currency, MarketSnapshot, OrderId, OrderSide, RestingOrder};
use quoter_gateway::{CancelOutcome, ExchangeGateway, NewOrderRequest};

/// Capacity of the per-instrument fill notification channel.
pub const FILL_QUEUE_CAPACITY: usize = 128;

/// Pause between the cancel phase and each order creation for book-fed
/// strategies, to stay under the venue's burst limit.
const INTER_LEG_DELAY: Duration = Duration::from_millis(101);

/// Quoting engine for a single instrument.
///
/// Holds at most one resting order per side. Orders leave a slot only
/// through a confirmed cancel or an "already filled" cancel response;
/// any other cancel outcome leaves the slot occupied for the next tick.
pub struct QuoteEngine<G> {
    config: InstrumentConfig,
    gateway: Arc<G>,
    buy_slot: Option<RestingOrder>,
    sell_slot: Option<RestingOrder>,
    fill_tx: mpsc::Sender<OrderId>,
}

impl<G: ExchangeGateway> QuoteEngine<G> {
    pub fn new(config: InstrumentConfig, gateway: Arc<G>, fill_tx: mpsc::Sender<OrderId>) -> Self {
        Self {
            config,
            gateway,
            buy_slot: None,
            sell_slot: None,
            fill_tx,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Currently resting order on `side`, if any.
    pub fn resting(&self, side: OrderSide) -> Option<&RestingOrder> {
        self.slot(side).as_ref()
    }

    /// Tick until `shutdown` fires. Each tick is wrapped in a panic
    /// guard so one failing tick cannot kill the instrument's loop, and
    /// the period is measured from tick completion, not wall clock.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            symbol = %self.config.symbol,
            strategy = self.config.strategy.kind(),
            period_secs = self.config.period_secs,
            one_sided = self.config.one_sided,
            "quote engine started"
        );
        let period = Duration::from_secs(self.config.period_secs);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = sleep(period) => {}
            }
            if let Err(payload) = AssertUnwindSafe(self.tick()).catch_unwind().await {
                error!(
                    symbol = %self.config.symbol,
                    panic = panic_message(payload.as_ref()),
                    "tick panicked, resuming next period"
                );
            }
        }
        info!(symbol = %self.config.symbol, "quote engine stopped");
    }

    /// One cancel/re-quote cycle.
    ///
    /// Persistent strategies need fresh market data to evaluate their
    /// cancel predicate, so they fetch the snapshot up front and skip
    /// the whole tick when it is unavailable. The re-quote-every-tick
    /// strategies cancel unconditionally first and only then fetch.
    pub async fn tick(&mut self) {
        let pre_fetched = if self.config.strategy.is_persistent() {
            match self.usable_snapshot().await {
                Some(snapshot) => Some(snapshot),
                None => return,
            }
        } else {
            None
        };

        self.cancel_side(OrderSide::Sell, pre_fetched.as_ref()).await;
        self.cancel_side(OrderSide::Buy, pre_fetched.as_ref()).await;

        let snapshot = match pre_fetched {
            Some(snapshot) => snapshot,
            None => match self.usable_snapshot().await {
                Some(snapshot) => snapshot,
                None => return,
            },
        };

        if self.config.strategy.needs_book() {
            sleep(INTER_LEG_DELAY).await;
        }
        self.create_sell(&snapshot).await;

        if self.config.strategy.needs_book() {
            sleep(INTER_LEG_DELAY).await;
        }
        self.create_buy(&snapshot).await;
    }

    fn slot(&self, side: OrderSide) -> &Option<RestingOrder> {
        match side {
            OrderSide::Buy => &self.buy_slot,
            OrderSide::Sell => &self.sell_slot,
        }
    }

    fn slot_mut(&mut self, side: OrderSide) -> &mut Option<RestingOrder> {
        match side {
            OrderSide::Buy => &mut self.buy_slot,
            OrderSide::Sell => &mut self.sell_slot,
        }
    }

    /// Fetch the snapshot kind the strategy prices from, returning `None`
    /// (after logging) on fetch failure or unusable data.
    async fn usable_snapshot(&self) -> Option<MarketSnapshot> {
        let fetched = if self.config.strategy.needs_book() {
            self.gateway
                .depth(&self.config.symbol, &self.config.depth_tag)
                .await
                .map(MarketSnapshot::Book)
        } else {
            self.gateway
                .ticker(&self.config.symbol)
                .await
                .map(|ticker| MarketSnapshot::LastTrade(ticker.last))
        };
        match fetched {
            Ok(snapshot) if snapshot.is_usable() => Some(snapshot),
            Ok(_) => {
                warn!(symbol = %self.config.symbol, "market snapshot unusable, skipping");
                None
            }
            Err(err) => {
                warn!(symbol = %self.config.symbol, %err, "market snapshot fetch failed");
                None
            }
        }
    }

    async fn cancel_side(&mut self, side: OrderSide, snapshot: Option<&MarketSnapshot>) {
        let Some(resting) = self.slot(side).clone() else {
            return;
        };
        if !self.config.strategy.should_cancel(
            side,
            resting.price,
            snapshot,
            self.config.price_precision,
        ) {
            return;
        }
        match self.gateway.cancel_order(&resting.id).await {
            Ok(CancelOutcome::Cancelled) => {
                debug!(symbol = %self.config.symbol, order = %resting, "order cancelled");
                *self.slot_mut(side) = None;
            }
            Ok(CancelOutcome::AlreadyFilled) => {
                info!(symbol = %self.config.symbol, order = %resting, "order filled");
                *self.slot_mut(side) = None;
                self.notify_fill(resting.id);
            }
            Err(err) => {
                warn!(
                    symbol = %self.config.symbol,
                    order_id = %resting.id,
                    %err,
                    "cancel failed, order left resting"
                );
            }
        }
    }

    async fn create_sell(&mut self, snapshot: &MarketSnapshot) {
        if self.sell_slot.is_some() {
            return;
        }
        let symbol = self.config.symbol.clone();
        let Some(base) = base_currency(&symbol) else {
            warn!(symbol = %symbol, "symbol has no recognized quote currency suffix");
            return;
        };
        let available = match self.gateway.available_balance(base).await {
            Ok(available) => available,
            Err(err) => {
                warn!(symbol = %symbol, currency = base, %err, "balance lookup failed");
                return;
            }
        };
        if available < self.config.min_asset {
            debug!(symbol = %symbol, %available, "asset balance below minimum, not selling");
            return;
        }
        let Some(price) = self
            .config
            .strategy
            .sell_price(snapshot, self.config.price_precision)
        else {
            warn!(symbol = %symbol, "snapshot too shallow for sell price");
            return;
        };
        let size = self.config.strategy.sell_size(
            available,
            self.config.balance_cap,
            price,
            self.config.asset_precision,
        );
        if !size.is_positive() {
            debug!(symbol = %symbol, "sell size floored to zero, not selling");
            return;
        }
        let request = NewOrderRequest::limit(&symbol, OrderSide::Sell, price, size);
        match self.gateway.create_order(&request).await {
            Ok(ack) => {
                debug!(symbol = %symbol, %price, %size, order_id = %ack.order_id, "sell order placed");
                self.sell_slot = Some(RestingOrder {
                    id: ack.order_id,
                    side: OrderSide::Sell,
                    price,
                    size,
                });
            }
            Err(err) => {
                warn!(symbol = %symbol, %err, "create sell order failed");
            }
        }
    }

    async fn create_buy(&mut self, snapshot: &MarketSnapshot) {
        if self.buy_slot.is_some() {
            return;
        }
        if self.config.one_sided && self.sell_slot.is_some() {
            debug!(symbol = %self.config.symbol, "one-sided mode, sell already resting");
            return;
        }
        let symbol = self.config.symbol.clone();
        let Some(quote) = quote_currency(&symbol) else {
            warn!(symbol = %symbol, "symbol has no recognized quote currency suffix");
            return;
        };
        let available = match self.gateway.available_balance(quote).await {
            Ok(available) => available,
            Err(err) => {
                warn!(symbol = %symbol, currency = quote, %err, "balance lookup failed");
                return;
            }
        };
        if available < self.config.min_balance {
            debug!(symbol = %symbol, %available, "quote balance below minimum, not buying");
            return;
        }
        let usable = available.min(self.config.balance_cap);
        let Some(price) = self
            .config
            .strategy
            .buy_price(snapshot, self.config.price_precision)
        else {
            warn!(symbol = %symbol, "snapshot too shallow for buy price");
            return;
        };
        let size = buy_size(usable, price, self.config.asset_precision);
        if !size.is_positive() {
            debug!(symbol = %symbol, "buy size floored to zero, not buying");
            return;
        }
        let request = NewOrderRequest::limit(&symbol, OrderSide::Buy, price, size);
        match self.gateway.create_order(&request).await {
            Ok(ack) => {
                debug!(symbol = %symbol, %price, %size, order_id = %ack.order_id, "buy order placed");
                self.buy_slot = Some(RestingOrder {
                    id: ack.order_id,
                    side: OrderSide::Buy,
                    price,
                    size,
                });
            }
            Err(err) => {
                warn!(symbol = %symbol, %err, "create buy order failed");
            }
        }
    }

    /// Non-blocking enqueue of a fill notification. A full queue drops
    /// the notification rather than stalling the tick.
    fn notify_fill(&self, order_id: OrderId) {
        use tokio::sync::mpsc::error::TrySendError;
        match self.fill_tx.try_send(order_id) {
            Ok(()) => {}
            Err(TrySendError::Full(order_id)) => {
                warn!(symbol = %self.config.symbol, %order_id, "fill queue full, notification dropped");
            }
            Err(TrySendError::Closed(order_id)) => {
                warn!(symbol = %self.config.symbol, %order_id, "fill queue closed, notification dropped");
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "opaque panic payload"
    }
}
