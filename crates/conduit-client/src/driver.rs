//! Tick loop: poll settings, fire a batch, repeat until shutdown.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::app_state::AppState;

pub struct Driver {
    state: AppState,
}

impl Driver {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// One tick. Polling both settings here is what surfaces drift
    /// annotations while the harness runs.
    pub fn tick(&self) -> usize {
        let poller = self.state.poller();
        let client_concurrency = poller.client_concurrency();
        let server_processing_time_ms = poller.server_processing_time_millis();
        tracing::debug!(client_concurrency, server_processing_time_ms, "settings polled");

        self.state.dispatcher().dispatch_batch()
    }

    /// Tick until `shutdown` resolves, then drain. Returns the number of
    /// requests aborted at the drain deadline.
    pub async fn run<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let cfg = &self.state.cfg().client;
        let mut ticker = tokio::time::interval(Duration::from_millis(cfg.tick_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(base_url = %cfg.base_url, path = %cfg.path, tick_ms = cfg.tick_interval_ms, "driver started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }

        self.state.set_draining();
        let drain = Duration::from_millis(self.state.cfg().shutdown.drain_timeout_ms);
        tracing::info!(in_flight = self.state.dispatcher().in_flight(), drain_ms = drain.as_millis() as u64, "draining");
        self.state.dispatcher().shutdown(drain).await
    }
}
