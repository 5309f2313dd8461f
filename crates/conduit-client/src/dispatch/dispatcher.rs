//! Self-sizing batch dispatcher.
//!
//! Each `dispatch_batch` reads the desired request count from the concurrency
//! file, publishes it on the concurrency gauge, and spawns that many
//! independent GET tasks without waiting for them.
//!
//! Tasks are tracked in a `JoinSet` so callers can `drain` them, and each one
//! holds a permit from a semaphore sized by `max_in_flight`: at most that many
//! requests execute at once, the rest wait for a permit. The set itself is
//! capped by `max_pending`; requests beyond it are skipped, not queued.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use conduit_core::settings::read_first_int;

use crate::obs::ClientMetrics;
use crate::transport::HttpTransport;

/// Counts one executing request; decrements exactly once on drop, including
/// when the owning task is aborted.
pub struct InFlightGuard {
    counter: Arc<AtomicI64>,
}

impl InFlightGuard {
    pub fn enter(counter: &Arc<AtomicI64>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter: Arc::clone(counter) }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

struct Inner {
    transport: Arc<HttpTransport>,
    path: String,
    permits: Arc<Semaphore>,
    in_flight: Arc<AtomicI64>,
}

impl Inner {
    async fn fire_request(&self) {
        // The semaphore is never closed; a failed acquire only means teardown.
        let Ok(_permit) = Arc::clone(&self.permits).acquire_owned().await else {
            return;
        };
        let _guard = InFlightGuard::enter(&self.in_flight);

        match self.transport.get_text(&self.path).await {
            Ok(body) => tracing::info!("Response from server: {body}"),
            Err(e) => tracing::warn!(
                path = %self.path,
                code = e.code(),
                error = %e,
                "Failed to get response"
            ),
        }
    }
}

pub struct RequestDispatcher {
    inner: Arc<Inner>,
    concurrency_file: PathBuf,
    default_concurrency: i64,
    max_pending: usize,
    metrics: Arc<ClientMetrics>,
    tasks: Mutex<JoinSet<()>>,
    closed: AtomicBool,
}

impl RequestDispatcher {
    pub fn new(
        transport: Arc<HttpTransport>,
        path: impl Into<String>,
        concurrency_file: impl Into<PathBuf>,
        default_concurrency: i64,
        max_in_flight: usize,
        max_pending: usize,
        metrics: Arc<ClientMetrics>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                path: path.into(),
                permits: Arc::new(Semaphore::new(max_in_flight)),
                in_flight: Arc::new(AtomicI64::new(0)),
            }),
            concurrency_file: concurrency_file.into(),
            default_concurrency,
            max_pending,
            metrics,
            tasks: Mutex::new(JoinSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Read the desired batch size and update the concurrency gauge.
    /// Missing, unreadable or unparsable files yield the default.
    pub fn concurrency(&self) -> i64 {
        let value = match read_first_int(&self.concurrency_file) {
            Ok(Some(v)) => v,
            Ok(None) => {
                self.metrics
                    .settings_read_errors
                    .inc(&[("source", "concurrency_file"), ("code", "PARSE")]);
                tracing::warn!(path = %self.concurrency_file.display(), "no integer in concurrency file, using default");
                self.default_concurrency
            }
            Err(e) => {
                self.metrics
                    .settings_read_errors
                    .inc(&[("source", "concurrency_file"), ("code", e.code())]);
                tracing::error!(path = %self.concurrency_file.display(), error = %e, "concurrency file could not be read, using default");
                self.default_concurrency
            }
        };
        self.metrics.concurrency.set(&[], value);
        value
    }

    /// Spawn one batch and return how many tasks were scheduled. Must be
    /// called from within a tokio runtime. Returns 0 after `shutdown`.
    ///
    /// At most `max_pending` tasks are outstanding at once (waiting for a
    /// permit or executing). Requests past that cap are skipped and counted,
    /// so a large concurrency value cannot grow memory without bound.
    pub fn dispatch_batch(&self) -> usize {
        if self.closed.load(Ordering::SeqCst) {
            return 0;
        }

        let wanted = usize::try_from(self.concurrency()).unwrap_or(0);

        let mut tasks = self.lock_tasks();
        // `shutdown` may have taken the set between the check above and the lock.
        if self.closed.load(Ordering::SeqCst) {
            return 0;
        }
        // Reap finished tasks so the set only holds outstanding work.
        while let Some(res) = tasks.try_join_next() {
            log_join(res);
        }

        let room = self.max_pending.saturating_sub(tasks.len());
        let count = wanted.min(room);
        tracing::info!("Firing {} requests (already in flight {})", count, self.in_flight());
        if count < wanted {
            let skipped = wanted - count;
            self.metrics
                .requests_skipped
                .add(&[], u64::try_from(skipped).unwrap_or(u64::MAX));
            tracing::warn!(
                wanted,
                skipped,
                outstanding = tasks.len(),
                max_pending = self.max_pending,
                "pending request cap reached, skipping"
            );
        }

        for _ in 0..count {
            let inner = Arc::clone(&self.inner);
            tasks.spawn(async move { inner.fire_request().await });
        }
        count
    }

    /// Issue a single request on the caller's task.
    pub async fn fire_request(&self) {
        self.inner.fire_request().await;
    }

    /// Requests currently executing (holding a permit).
    pub fn in_flight(&self) -> i64 {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Last value published on the concurrency gauge.
    pub fn concurrency_gauge(&self) -> i64 {
        self.metrics.concurrency.get(&[])
    }

    /// Tasks spawned and not yet reaped.
    pub fn outstanding(&self) -> usize {
        self.lock_tasks().len()
    }

    /// Await every outstanding task, including ones spawned while draining.
    /// Cancelling this future aborts the tasks it was awaiting.
    pub async fn drain(&self) {
        loop {
            let mut set = std::mem::take(&mut *self.lock_tasks());
            if set.is_empty() {
                return;
            }
            while let Some(res) = set.join_next().await {
                log_join(res);
            }
        }
    }

    /// Stop accepting batches, drain until `timeout`, then abort whatever is
    /// left. Returns the number of aborted tasks.
    pub async fn shutdown(&self, timeout: Duration) -> usize {
        self.closed.store(true, Ordering::SeqCst);
        let deadline = tokio::time::Instant::now() + timeout;

        let mut set = JoinSet::new();
        loop {
            if set.is_empty() {
                set = std::mem::take(&mut *self.lock_tasks());
                if set.is_empty() {
                    return 0;
                }
            }
            match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(res)) => log_join(res),
                Ok(None) => continue,
                Err(_) => break,
            }
        }

        // Anything spawned by a batch that raced the close goes too.
        let mut late = std::mem::take(&mut *self.lock_tasks());
        let aborted = set.len() + late.len();
        set.abort_all();
        late.abort_all();
        // Join aborted tasks so their in-flight guards have run on return.
        for s in [&mut set, &mut late] {
            while let Some(res) = s.join_next().await {
                log_join(res);
            }
        }
        tracing::warn!(aborted, "drain deadline reached, aborted outstanding requests");
        aborted
    }

    fn lock_tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        match self.tasks.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn log_join(res: Result<(), JoinError>) {
    if let Err(e) = res {
        if e.is_panic() {
            tracing::error!(error = %e, "request task panicked");
        }
    }
}
