use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use conduit_core::annotation::Annotation;

use super::{AnnotationBackend, AnnotationSink};
use crate::obs::ClientMetrics;

/// Bounded hand-off from the poller to a background publisher.
#[derive(Clone)]
pub struct AnnotationQueue {
    tx: mpsc::Sender<Annotation>,
    metrics: Arc<ClientMetrics>,
}

impl AnnotationQueue {
    /// Spawn the publisher task. It exits once every queue handle is dropped
    /// and the backlog is flushed.
    pub fn spawn(
        backend: Arc<dyn AnnotationBackend>,
        capacity: usize,
        metrics: Arc<ClientMetrics>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Annotation>(capacity);
        let worker_metrics = Arc::clone(&metrics);

        let worker = tokio::spawn(async move {
            while let Some(a) = rx.recv().await {
                match backend.publish(&a).await {
                    Ok(()) => {
                        worker_metrics.annotations.inc(&[("backend", backend.name())]);
                    }
                    Err(e) => {
                        worker_metrics
                            .annotation_failures
                            .inc(&[("backend", backend.name())]);
                        tracing::warn!(
                            backend = backend.name(),
                            code = e.code(),
                            error = %e,
                            text = %a.text,
                            "annotation publish failed"
                        );
                    }
                }
            }
        });

        (Self { tx, metrics }, worker)
    }
}

impl AnnotationSink for AnnotationQueue {
    fn annotate(&self, annotation: Annotation) {
        // Lossy: never block the caller's critical section.
        if let Err(e) = self.tx.try_send(annotation) {
            self.metrics.annotations_dropped.inc(&[]);
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "full",
                mpsc::error::TrySendError::Closed(_) => "closed",
            };
            tracing::warn!(reason, "annotation dropped");
        }
    }
}
