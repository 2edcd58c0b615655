//! Main application orchestration.
//!
//! Builds one shared REST gateway, then spawns a quote engine and a fill
//! recorder per configured instrument. Instruments are fully independent;
//! the only shared state is the read-only gateway handle. Shutdown is a
//! single cancellation token fanned out to every task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;
use quoter_engine::{QuoteEngine, FILL_QUEUE_CAPACITY};
use quoter_gateway::{Credentials, RestGateway};
use quoter_recorder::{FillRecorder, JsonLinesStore};

pub struct Application {
    config: AppConfig,
    gateway: Arc<RestGateway>,
}

impl Application {
    pub fn new(config: AppConfig, credentials: Credentials) -> AppResult<Self> {
        config.validate()?;
        let gateway = Arc::new(RestGateway::new(&config.gateway.base_url, credentials)?);
        Ok(Self { config, gateway })
    }

    /// Spawn all instrument loops and block until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        let shutdown = CancellationToken::new();
        let drain_pause = Duration::from_secs(self.config.recorder.drain_pause_secs);
        let mut tasks: Vec<JoinHandle<()>> = Vec::new();

        for instrument in &self.config.instruments {
            let symbol = instrument.symbol.clone();
            let (fill_tx, fill_rx) = mpsc::channel(FILL_QUEUE_CAPACITY);

            let engine = QuoteEngine::new(
                instrument.clone(),
                Arc::clone(&self.gateway),
                fill_tx,
            );
            let store = JsonLinesStore::new(&self.config.recorder.data_dir);
            let recorder = FillRecorder::new(Arc::clone(&self.gateway), store, fill_rx)
                .with_drain_pause(drain_pause);

            info!(symbol = %symbol, "starting instrument");
            tasks.push(tokio::spawn(engine.run(shutdown.clone())));
            tasks.push(tokio::spawn(recorder.run(shutdown.clone())));
        }

        tokio::signal::ctrl_c().await?;
        info!("shutdown signal received, stopping instruments");
        shutdown.cancel();

        for task in tasks {
            if let Err(err) = task.await {
                warn!(%err, "instrument task ended abnormally");
            }
        }
        info!("all instruments stopped");
        Ok(())
    }
}
