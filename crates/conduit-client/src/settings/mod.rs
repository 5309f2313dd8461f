//! Polled settings with drift detection.

pub mod poller;

pub use poller::{
    now_millis, LastValues, SettingsPoller, CLIENT_CONCURRENCY_KEY, SERVER_PROCESSING_TIME_KEY,
};
