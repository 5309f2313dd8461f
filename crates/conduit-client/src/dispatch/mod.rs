//! Batch request dispatch.
//!
//! Re-exports the dispatcher so downstream consumers can depend on this module
//! directly.

pub mod dispatcher;

pub use dispatcher::{InFlightGuard, RequestDispatcher};
