//! conduit core: runtime-agnostic primitives shared by the client harness.
//!
//! This crate defines the error surface, the two setting file formats
//! (properties and scalar concurrency file) and the annotation record. It
//! carries no async runtime or HTTP dependency so it can be reused by tools
//! that only need to read or validate settings.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! surfaces as `ConduitError`/`Result`; the caller decides what "fall back to
//! default" means.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod annotation;
pub mod error;
pub mod settings;

/// Shared result type.
pub use error::{ConduitError, Result};
