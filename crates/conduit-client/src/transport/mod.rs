//! Outbound HTTP transport with per-request instrumentation.

pub mod http;

pub use http::{HttpTransport, Outcome, TIMESTAMP_HEADER};
