//! Drift annotations: sink seam, delivery queue, and backends.
//!
//! The poller calls `AnnotationSink::annotate` from inside its critical
//! section, so the sink must never block or await. `AnnotationQueue` hands the
//! record to a background worker which publishes through an
//! `AnnotationBackend`. Delivery is best-effort: a full queue or a failing
//! backend is logged and counted, never surfaced to the poller.

pub mod backend;
pub mod queue;

use conduit_core::annotation::Annotation;

pub use backend::{AnnotationBackend, GrafanaBackend, LogBackend};
pub use queue::AnnotationQueue;

/// Non-blocking annotation seam.
pub trait AnnotationSink: Send + Sync {
    fn annotate(&self, annotation: Annotation);
}
