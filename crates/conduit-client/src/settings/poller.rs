//! Properties-backed settings poller.
//!
//! Every `resolve` re-reads the properties file so external edits take effect
//! without a restart. The last resolved value per key lives in `LastValues`;
//! "read prior, compare, annotate, store" runs under one lock so two polls of
//! the same key can never lose an update or double-report a change.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use conduit_core::annotation::Annotation;
use conduit_core::error::{ConduitError, Result};
use conduit_core::settings::read_properties;

use crate::annotate::AnnotationSink;
use crate::obs::ClientMetrics;

pub const CLIENT_CONCURRENCY_KEY: &str = "client.concurrency";
pub const SERVER_PROCESSING_TIME_KEY: &str = "server.processing.time";

const DEFAULT_CONCURRENCY: i64 = 1;
const DEFAULT_SERVER_PROCESSING_TIME_SEC: i64 = 4;

/// Epoch milliseconds (0 if the clock is before the epoch).
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Last observed value per setting key.
#[derive(Default)]
pub struct LastValues {
    inner: Mutex<HashMap<String, i64>>,
}

impl LastValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for `key`. If a prior value exists and differs,
    /// `on_change` receives the annotation while the lock is still held.
    pub fn swap(&self, key: &str, value: i64, on_change: impl FnOnce(Annotation)) {
        let mut map = match self.inner.lock() {
            Ok(g) => g,
            // A panicking holder cannot leave the map half-written.
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(&prior) = map.get(key) {
            if let Some(a) = Annotation::between(key, prior, value, now_millis()) {
                on_change(a);
            }
        }
        map.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        match self.inner.lock() {
            Ok(g) => g.get(key).copied(),
            Err(poisoned) => poisoned.into_inner().get(key).copied(),
        }
    }
}

pub struct SettingsPoller {
    path: PathBuf,
    last: LastValues,
    sink: Arc<dyn AnnotationSink>,
    metrics: Arc<ClientMetrics>,
}

impl SettingsPoller {
    pub fn new(
        path: impl Into<PathBuf>,
        sink: Arc<dyn AnnotationSink>,
        metrics: Arc<ClientMetrics>,
    ) -> Self {
        Self {
            path: path.into(),
            last: LastValues::new(),
            sink,
            metrics,
        }
    }

    /// Resolve `key` from the properties file, falling back to `default` when
    /// the file is unreadable or the key is absent/unparsable. Never fails.
    pub fn resolve(&self, key: &str, default: i64) -> i64 {
        let value = match self.read(key) {
            Ok(Some(v)) => v,
            Ok(None) => default,
            Err(e) => {
                self.metrics
                    .settings_read_errors
                    .inc(&[("source", "properties"), ("code", e.code())]);
                tracing::error!(key, path = %self.path.display(), error = %e, "setting could not be read, using default");
                default
            }
        };

        self.last.swap(key, value, |a| {
            tracing::info!(key, value, "{}", a.text);
            self.sink.annotate(a);
        });

        value
    }

    pub fn client_concurrency(&self) -> i64 {
        self.resolve(CLIENT_CONCURRENCY_KEY, DEFAULT_CONCURRENCY)
    }

    /// Configured in whole seconds, reported in milliseconds.
    pub fn server_processing_time_millis(&self) -> i64 {
        self.resolve(SERVER_PROCESSING_TIME_KEY, DEFAULT_SERVER_PROCESSING_TIME_SEC)
            .saturating_mul(1000)
    }

    /// Last resolved value for `key`, without re-reading the file.
    pub fn last_value(&self, key: &str) -> Option<i64> {
        self.last.get(key)
    }

    fn read(&self, key: &str) -> Result<Option<i64>> {
        let props = read_properties(&self.path)?;
        props.get_int(key).transpose().map_err(|e| match e {
            ConduitError::Parse(msg) => ConduitError::Parse(format!("{}: {msg}", self.path.display())),
            other => other,
        })
    }
}
