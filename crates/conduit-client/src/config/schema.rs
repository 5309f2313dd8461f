use serde::Deserialize;
use conduit_core::error::{ConduitError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub client: ClientSection,

    #[serde(default)]
    pub settings: SettingsSection,

    #[serde(default)]
    pub annotations: AnnotationsSection,

    #[serde(default)]
    pub ops: OpsSection,

    #[serde(default)]
    pub shutdown: ShutdownSection,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ConduitError::UnsupportedVersion);
        }

        self.client.validate()?;
        self.annotations.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Upper bound on requests executing at once, across all batches.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Upper bound on spawned-but-unfinished request tasks. Batch requests
    /// beyond it are skipped and counted.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,

    #[serde(default = "default_concurrency_file")]
    pub concurrency_file: String,

    #[serde(default = "default_concurrency")]
    pub default_concurrency: i64,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            tick_interval_ms: default_tick_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_in_flight: default_max_in_flight(),
            max_pending: default_max_pending(),
            concurrency_file: default_concurrency_file(),
            default_concurrency: default_concurrency(),
        }
    }
}

impl ClientSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConduitError::BadRequest(
                "client.base_url must start with http:// or https://".into(),
            ));
        }
        if !self.path.starts_with('/') {
            return Err(ConduitError::BadRequest("client.path must start with '/'".into()));
        }
        if !(10..=60_000).contains(&self.tick_interval_ms) {
            return Err(ConduitError::BadRequest(
                "client.tick_interval_ms must be between 10 and 60000".into(),
            ));
        }
        if !(100..=300_000).contains(&self.request_timeout_ms) {
            return Err(ConduitError::BadRequest(
                "client.request_timeout_ms must be between 100 and 300000".into(),
            ));
        }
        if !(1..=100_000).contains(&self.max_in_flight) {
            return Err(ConduitError::BadRequest(
                "client.max_in_flight must be between 1 and 100000".into(),
            ));
        }
        if !(self.max_in_flight..=1_000_000).contains(&self.max_pending) {
            return Err(ConduitError::BadRequest(
                "client.max_pending must be between max_in_flight and 1000000".into(),
            ));
        }
        if self.default_concurrency < 0 {
            return Err(ConduitError::BadRequest(
                "client.default_concurrency must not be negative".into(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".into()
}
fn default_path() -> String {
    "/hello".into()
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_max_in_flight() -> usize {
    1024
}
fn default_max_pending() -> usize {
    10_000
}
fn default_concurrency_file() -> String {
    "../common_concurrent_requests.txt".into()
}
fn default_concurrency() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsSection {
    #[serde(default = "default_properties_file")]
    pub properties_file: String,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self { properties_file: default_properties_file() }
    }
}

fn default_properties_file() -> String {
    "../conduit_config.properties".into()
}

/// Where drift annotations go. No `url` means log-only.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationsSection {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_tags")]
    pub tags: Vec<String>,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for AnnotationsSection {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            tags: default_tags(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl AnnotationsSection {
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(ConduitError::BadRequest(
                "annotations.queue_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn default_tags() -> Vec<String> {
    vec!["conduit".into()]
}
fn default_queue_capacity() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpsSection {
    #[serde(default = "default_ops_listen")]
    pub listen: String,
}

impl Default for OpsSection {
    fn default() -> Self {
        Self { listen: default_ops_listen() }
    }
}

fn default_ops_listen() -> String {
    "0.0.0.0:9090".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShutdownSection {
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

impl Default for ShutdownSection {
    fn default() -> Self {
        Self { drain_timeout_ms: default_drain_timeout_ms() }
    }
}

fn default_drain_timeout_ms() -> u64 {
    5000
}
