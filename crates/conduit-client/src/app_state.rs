//! Shared application state for the conduit client.
//!
//! Wires metrics, the annotation pipeline, the settings poller and the request
//! dispatcher from one validated config. Startup errors are returned, not
//! panicked on.

use std::sync::Arc;
use std::time::Duration;

use conduit_core::error::Result;

use crate::annotate::{AnnotationBackend, AnnotationQueue, AnnotationSink, GrafanaBackend, LogBackend};
use crate::config::ClientConfig;
use crate::dispatch::RequestDispatcher;
use crate::obs::ClientMetrics;
use crate::settings::SettingsPoller;
use crate::transport::HttpTransport;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ClientConfig,
    metrics: Arc<ClientMetrics>,
    poller: SettingsPoller,
    dispatcher: RequestDispatcher,
}

impl AppState {
    /// Build state with the annotation backend selected by config.
    /// Must be called inside a tokio runtime (spawns the annotation worker).
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let metrics = Arc::new(ClientMetrics::default());

        let backend: Arc<dyn AnnotationBackend> = match &cfg.annotations.url {
            Some(url) => Arc::new(GrafanaBackend::new(
                url,
                cfg.annotations.token.clone(),
                cfg.annotations.tags.clone(),
            )?),
            None => Arc::new(LogBackend),
        };
        tracing::info!(backend = backend.name(), "annotation backend selected");

        // The worker exits on its own once the last queue handle is dropped.
        let (queue, _worker) =
            AnnotationQueue::spawn(backend, cfg.annotations.queue_capacity, Arc::clone(&metrics));

        Self::with_sink(cfg, Arc::new(queue), metrics)
    }

    /// Build state around a caller-provided annotation sink.
    pub fn with_sink(
        cfg: ClientConfig,
        sink: Arc<dyn AnnotationSink>,
        metrics: Arc<ClientMetrics>,
    ) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(
            &cfg.client.base_url,
            Duration::from_millis(cfg.client.request_timeout_ms),
            Arc::clone(&metrics),
        )?);

        let poller = SettingsPoller::new(
            cfg.settings.properties_file.clone(),
            sink,
            Arc::clone(&metrics),
        );

        let dispatcher = RequestDispatcher::new(
            transport,
            cfg.client.path.clone(),
            cfg.client.concurrency_file.clone(),
            cfg.client.default_concurrency,
            cfg.client.max_in_flight,
            cfg.client.max_pending,
            Arc::clone(&metrics),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, metrics, poller, dispatcher }),
        })
    }

    pub fn cfg(&self) -> &ClientConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.inner.metrics
    }

    pub fn poller(&self) -> &SettingsPoller {
        &self.inner.poller
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.inner.dispatcher
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Values owned outside the metrics registry.
    pub fn metrics_extra(&self) -> Vec<(&'static str, i64)> {
        let d = self.dispatcher();
        vec![
            ("conduit_client_requests_in_flight", d.in_flight()),
            (
                "conduit_client_tasks_outstanding",
                i64::try_from(d.outstanding()).unwrap_or(i64::MAX),
            ),
        ]
    }
}
