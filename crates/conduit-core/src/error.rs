//! Shared error type across conduit crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, ConduitError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum ConduitError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("read {path} failed: {message}")]
    Io { path: String, message: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("http: {0}")]
    Http(String),
    #[error("timeout")]
    Timeout,
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ConduitError {
    /// Build an `Io` error from a path and the underlying io error.
    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        ConduitError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// Stable code used as a log field and in assertions.
    pub fn code(&self) -> &'static str {
        match self {
            ConduitError::BadRequest(_) => "BAD_REQUEST",
            ConduitError::Io { .. } => "IO",
            ConduitError::Parse(_) => "PARSE",
            ConduitError::Http(_) => "HTTP",
            ConduitError::Timeout => "TIMEOUT",
            ConduitError::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ConduitError::Internal(_) => "INTERNAL",
        }
    }
}
