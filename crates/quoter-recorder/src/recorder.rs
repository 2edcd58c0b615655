//! Fill recorder worker.
//!
//! One recorder runs beside each instrument's tick loop, draining the
//! bounded fill-notification channel. For each order identifier it looks
//! up the order detail, maps it to a [`FillRecord`], and appends it to
//! the store. Persistence is at-most-once: a failed lookup or append is
//! logged and the fill is not retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::store::FillStore;
use quoter_core::{FillRecord, OrderId, Price, Size};
use quoter_gateway::ExchangeGateway;

/// Pause after each recorded fill, bounding the detail-lookup request
/// rate against the venue.
pub const DRAIN_PAUSE: Duration = Duration::from_secs(5);

pub struct FillRecorder<G, S> {
    gateway: Arc<G>,
    store: S,
    fill_rx: mpsc::Receiver<OrderId>,
    drain_pause: Duration,
}

impl<G: ExchangeGateway, S: FillStore> FillRecorder<G, S> {
    pub fn new(gateway: Arc<G>, store: S, fill_rx: mpsc::Receiver<OrderId>) -> Self {
        Self {
            gateway,
            store,
            fill_rx,
            drain_pause: DRAIN_PAUSE,
        }
    }

    pub fn with_drain_pause(mut self, pause: Duration) -> Self {
        self.drain_pause = pause;
        self
    }

    /// Drain notifications until `shutdown` fires or every sender is
    /// gone.
    pub async fn run(mut self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.fill_rx.recv() => {
                    let Some(order_id) = received else { break };
                    self.record(order_id).await;
                    sleep(self.drain_pause).await;
                }
            }
        }
        info!("fill recorder stopped");
    }

    async fn record(&mut self, order_id: OrderId) {
        let detail = match self.gateway.order_by_id(&order_id).await {
            Ok(detail) => detail,
            Err(err) => {
                warn!(%order_id, %err, "order detail lookup failed, fill not recorded");
                return;
            }
        };
        let record = FillRecord {
            order_id: detail.order_id,
            symbol: detail.symbol,
            side: detail.side,
            order_type: detail.order_type,
            price: Price::new(detail.price),
            amount: Size::new(detail.amount),
            state: detail.state,
            created_at: Utc::now(),
        };
        match self.store.append(&record) {
            Ok(()) => info!(%record, "fill recorded"),
            Err(err) => warn!(order_id = %record.order_id, %err, "fill persist failed, not retried"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use quoter_gateway::{GatewayError, MockGateway, OrderDetail};
    use rust_decimal_macros::dec;

    fn detail(id: &str) -> OrderDetail {
        OrderDetail {
            order_id: OrderId::new(id),
            symbol: "btcusdt".to_string(),
            side: "buy".to_string(),
            order_type: "limit".to_string(),
            price: dec!(9000.5),
            amount: dec!(0.01),
            state: "filled".to_string(),
        }
    }

    async fn wait_for_records(store: &MemoryStore, count: usize) {
        tokio::time::timeout(Duration::from_secs(120), async {
            while store.records().len() < count {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("records never appeared");
    }

    #[tokio::test(start_paused = true)]
    async fn records_fill_from_order_detail() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_detail(Ok(detail("b0")));
        let store = MemoryStore::new();
        let (tx, rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        let recorder = FillRecorder::new(Arc::clone(&gateway), store.clone(), rx);
        let handle = tokio::spawn(recorder.run(shutdown.clone()));

        tx.send(OrderId::new("b0")).await.unwrap();
        wait_for_records(&store, 1).await;

        let records = store.records();
        assert_eq!(records[0].order_id.as_str(), "b0");
        assert_eq!(records[0].symbol, "btcusdt");
        assert_eq!(records[0].price, Price::new(dec!(9000.5)));
        assert_eq!(records[0].state, "filled");

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_is_skipped_not_retried() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_detail(Err(GatewayError::Transport("timeout".to_string())));
        gateway.push_detail(Ok(detail("b1")));
        let store = MemoryStore::new();
        let (tx, rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        let recorder = FillRecorder::new(Arc::clone(&gateway), store.clone(), rx);
        let handle = tokio::spawn(recorder.run(shutdown.clone()));

        tx.send(OrderId::new("b0")).await.unwrap();
        tx.send(OrderId::new("b1")).await.unwrap();
        wait_for_records(&store, 1).await;

        // b0 was dropped after its failed lookup; only b1 got recorded
        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].order_id.as_str(), "b1");
        assert_eq!(gateway.detail_lookups().len(), 2);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_all_senders_dropped() {
        let gateway = Arc::new(MockGateway::new());
        let store = MemoryStore::new();
        let (tx, rx) = mpsc::channel::<OrderId>(8);
        let recorder = FillRecorder::new(gateway, store, rx);
        let handle = tokio::spawn(recorder.run(CancellationToken::new()));

        drop(tx);
        handle.await.unwrap();
    }
}
