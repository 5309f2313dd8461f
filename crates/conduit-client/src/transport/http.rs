//! Instrumented GET client.
//!
//! Every attempt passes through `HttpTransport::get_text`, which stamps the
//! client-side timestamp header and records one duration sample plus one
//! attempt count, both tagged by `Outcome`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use conduit_core::error::{ConduitError, Result};

use crate::obs::ClientMetrics;
use crate::settings::now_millis;

/// Header carrying the caller's epoch-millisecond timestamp.
pub const TIMESTAMP_HEADER: &str = "X-Client-Request-Timestamp-Millis";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    HttpError,
    Timeout,
    ConnectError,
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::HttpError => "http_error",
            Outcome::Timeout => "timeout",
            Outcome::ConnectError => "connect_error",
            Outcome::Error => "error",
        }
    }

    fn of(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Outcome::Timeout
        } else if err.is_connect() {
            Outcome::ConnectError
        } else if err.is_status() {
            Outcome::HttpError
        } else {
            Outcome::Error
        }
    }
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    metrics: Arc<ClientMetrics>,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration, metrics: Arc<ClientMetrics>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConduitError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            metrics,
        })
    }

    /// GET `path` under the base URL; non-2xx is an error.
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let started = Instant::now();
        let res = self.send(path).await;
        let outcome = match &res {
            Ok(_) => Outcome::Success,
            Err(e) => Outcome::of(e),
        };

        let labels = [("outcome", outcome.as_str())];
        self.metrics.requests.inc(&labels);
        self.metrics.request_duration.observe(&labels, started.elapsed());

        res.map_err(|e| match outcome {
            Outcome::Timeout => ConduitError::Timeout,
            _ => ConduitError::Http(e.to_string()),
        })
    }

    async fn send(&self, path: &str) -> std::result::Result<String, reqwest::Error> {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .header(TIMESTAMP_HEADER, now_millis().to_string())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}
