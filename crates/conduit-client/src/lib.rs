//! conduit client library entry.
//!
//! This crate wires the settings poller, annotation pipeline, instrumented
//! transport, request dispatcher and ops endpoints into the running harness.
//! It is consumed by the binary (`main.rs`) and by integration tests.

pub mod annotate;
pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod obs;
pub mod ops;
pub mod router;
pub mod settings;
pub mod transport;
