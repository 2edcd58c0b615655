//! Exchange gateway trait.
//!
//! Abstracts the venue's request/response surface so engine and recorder
//! can be driven by a mock in tests and by the REST client in production.
//! The handle is stateless from the caller's view: it is constructed once
//! by the process and shared read-only across instrument loops.

use std::pin::Pin;

use rust_decimal::Decimal;

use crate::error::GatewayResult;
use crate::types::{CancelOutcome, NewOrderRequest, OrderAck, OrderDetail};
use quoter_core::{Depth, OrderId, Ticker};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// The venue capability consumed by the quoting engine and fill recorder.
///
/// All calls are blocking from the caller's point of view; the only
/// timeout behavior is the HTTP client's own request timeout.
pub trait ExchangeGateway: Send + Sync {
    /// Fetch the order book for a symbol. `depth_tag` selects the venue's
    /// aggregation level (e.g. "L20").
    fn depth<'a>(&'a self, symbol: &'a str, depth_tag: &'a str) -> BoxFuture<'a, GatewayResult<Depth>>;

    /// Fetch the latest trade ticker for a symbol.
    fn ticker<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, GatewayResult<Ticker>>;

    /// Available (unfrozen) balance of a currency.
    fn available_balance<'a>(&'a self, currency: &'a str) -> BoxFuture<'a, GatewayResult<Decimal>>;

    /// Submit a limit order.
    fn create_order<'a>(&'a self, req: &'a NewOrderRequest) -> BoxFuture<'a, GatewayResult<OrderAck>>;

    /// Cancel a resting order. `Ok(AlreadyFilled)` is the fill-detection
    /// signal, not a failure.
    fn cancel_order<'a>(&'a self, id: &'a OrderId) -> BoxFuture<'a, GatewayResult<CancelOutcome>>;

    /// Look up an order's detail by identifier.
    fn order_by_id<'a>(&'a self, id: &'a OrderId) -> BoxFuture<'a, GatewayResult<OrderDetail>>;
}

#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockGateway;

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    //! Scripted gateway for engine and recorder tests.

    use std::collections::{HashMap, VecDeque};

    use parking_lot::Mutex;
    use rust_decimal::Decimal;

    use super::{BoxFuture, ExchangeGateway};
    use crate::error::{GatewayError, GatewayResult};
    use crate::types::{CancelOutcome, NewOrderRequest, OrderAck, OrderDetail};
    use quoter_core::{Depth, OrderId, Ticker};

    /// Mock gateway with per-method scripted responses and recorded calls.
    ///
    /// Scripted responses are consumed front-to-back; when a queue runs
    /// dry the method falls back to the persistent default, or fails with
    /// a transport error when none is set.
    #[derive(Default)]
    pub struct MockGateway {
        depth_queue: Mutex<VecDeque<GatewayResult<Depth>>>,
        default_depth: Mutex<Option<Depth>>,
        ticker_queue: Mutex<VecDeque<GatewayResult<Ticker>>>,
        default_ticker: Mutex<Option<Ticker>>,
        balances: Mutex<HashMap<String, Decimal>>,
        create_queue: Mutex<VecDeque<GatewayResult<OrderAck>>>,
        cancel_queue: Mutex<VecDeque<GatewayResult<CancelOutcome>>>,
        detail_queue: Mutex<VecDeque<GatewayResult<OrderDetail>>>,
        /// Recorded create-order requests, in call order.
        created: Mutex<Vec<NewOrderRequest>>,
        /// Recorded cancel requests, in call order.
        cancelled: Mutex<Vec<OrderId>>,
        /// Recorded detail lookups, in call order.
        looked_up: Mutex<Vec<OrderId>>,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_depth(&self, depth: Depth) {
            *self.default_depth.lock() = Some(depth);
        }

        pub fn push_depth(&self, result: GatewayResult<Depth>) {
            self.depth_queue.lock().push_back(result);
        }

        pub fn set_ticker(&self, ticker: Ticker) {
            *self.default_ticker.lock() = Some(ticker);
        }

        pub fn push_ticker(&self, result: GatewayResult<Ticker>) {
            self.ticker_queue.lock().push_back(result);
        }

        pub fn set_balance(&self, currency: &str, available: Decimal) {
            self.balances.lock().insert(currency.to_string(), available);
        }

        pub fn push_create(&self, result: GatewayResult<OrderAck>) {
            self.create_queue.lock().push_back(result);
        }

        pub fn push_cancel(&self, result: GatewayResult<CancelOutcome>) {
            self.cancel_queue.lock().push_back(result);
        }

        pub fn push_detail(&self, result: GatewayResult<OrderDetail>) {
            self.detail_queue.lock().push_back(result);
        }

        pub fn created_orders(&self) -> Vec<NewOrderRequest> {
            self.created.lock().clone()
        }

        pub fn cancelled_orders(&self) -> Vec<OrderId> {
            self.cancelled.lock().clone()
        }

        pub fn detail_lookups(&self) -> Vec<OrderId> {
            self.looked_up.lock().clone()
        }

        fn exhausted(method: &str) -> GatewayError {
            GatewayError::Transport(format!("mock: no scripted response for {method}"))
        }
    }

    impl ExchangeGateway for MockGateway {
        fn depth<'a>(
            &'a self,
            _symbol: &'a str,
            _depth_tag: &'a str,
        ) -> BoxFuture<'a, GatewayResult<Depth>> {
            Box::pin(async move {
                if let Some(result) = self.depth_queue.lock().pop_front() {
                    return result;
                }
                self.default_depth
                    .lock()
                    .clone()
                    .ok_or_else(|| Self::exhausted("depth"))
            })
        }

        fn ticker<'a>(&'a self, _symbol: &'a str) -> BoxFuture<'a, GatewayResult<Ticker>> {
            Box::pin(async move {
                if let Some(result) = self.ticker_queue.lock().pop_front() {
                    return result;
                }
                (*self.default_ticker.lock()).ok_or_else(|| Self::exhausted("ticker"))
            })
        }

        fn available_balance<'a>(
            &'a self,
            currency: &'a str,
        ) -> BoxFuture<'a, GatewayResult<Decimal>> {
            Box::pin(async move {
                self.balances
                    .lock()
                    .get(currency)
                    .copied()
                    .ok_or_else(|| Self::exhausted("available_balance"))
            })
        }

        fn create_order<'a>(
            &'a self,
            req: &'a NewOrderRequest,
        ) -> BoxFuture<'a, GatewayResult<OrderAck>> {
            Box::pin(async move {
                self.created.lock().push(req.clone());
                self.create_queue
                    .lock()
                    .pop_front()
                    .unwrap_or_else(|| Err(Self::exhausted("create_order")))
            })
        }

        fn cancel_order<'a>(
            &'a self,
            id: &'a OrderId,
        ) -> BoxFuture<'a, GatewayResult<CancelOutcome>> {
            Box::pin(async move {
                self.cancelled.lock().push(id.clone());
                self.cancel_queue
                    .lock()
                    .pop_front()
                    .unwrap_or_else(|| Err(Self::exhausted("cancel_order")))
            })
        }

        fn order_by_id<'a>(&'a self, id: &'a OrderId) -> BoxFuture<'a, GatewayResult<OrderDetail>> {
            Box::pin(async move {
                self.looked_up.lock().push(id.clone());
                self.detail_queue
                    .lock()
                    .pop_front()
                    .unwrap_or_else(|| Err(Self::exhausted("order_by_id")))
            })
        }
    }
}
