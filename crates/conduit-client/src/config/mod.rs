//! Client config loader (strict parsing).

pub mod schema;

use std::fs;

use conduit_core::error::{ConduitError, Result};

pub use schema::{
    AnnotationsSection, ClientConfig, ClientSection, OpsSection, SettingsSection, ShutdownSection,
};

pub fn load_from_file(path: &str) -> Result<ClientConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ConduitError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ClientConfig> {
    let cfg: ClientConfig = serde_yaml::from_str(s)
        .map_err(|e| ConduitError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
