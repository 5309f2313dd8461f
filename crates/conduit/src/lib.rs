//! Top-level facade crate for conduit.
//!
//! Re-exports core types and the client library so users can depend on a single crate.

pub mod core {
    pub use conduit_core::*;
}

pub mod client {
    pub use conduit_client::*;
}
