use async_trait::async_trait;
use serde_json::json;

use conduit_core::annotation::Annotation;
use conduit_core::error::{ConduitError, Result};

/// Publishes one annotation to an external backend.
#[async_trait]
pub trait AnnotationBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn publish(&self, annotation: &Annotation) -> Result<()>;
}

/// Grafana HTTP annotations API (`POST /api/annotations`).
pub struct GrafanaBackend {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    tags: Vec<String>,
}

impl GrafanaBackend {
    pub fn new(base_url: &str, token: Option<String>, tags: Vec<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| ConduitError::Internal(format!("annotation client build failed: {e}")))?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/annotations", base_url.trim_end_matches('/')),
            token,
            tags,
        })
    }
}

#[async_trait]
impl AnnotationBackend for GrafanaBackend {
    fn name(&self) -> &'static str {
        "grafana"
    }

    async fn publish(&self, annotation: &Annotation) -> Result<()> {
        let mut tags = self.tags.clone();
        tags.push(annotation.key.clone());

        let mut req = self.http.post(&self.endpoint).json(&json!({
            "time": annotation.time_ms,
            "text": annotation.text,
            "tags": tags,
        }));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ConduitError::Http(format!("annotation post failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(ConduitError::Http(format!(
                "annotation post rejected: {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

/// Log-only backend, used when no annotation URL is configured.
#[derive(Default)]
pub struct LogBackend;

#[async_trait]
impl AnnotationBackend for LogBackend {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn publish(&self, annotation: &Annotation) -> Result<()> {
        tracing::info!(
            key = %annotation.key,
            value = annotation.value,
            time_ms = annotation.time_ms,
            "annotation: {}",
            annotation.text
        );
        Ok(())
    }
}
