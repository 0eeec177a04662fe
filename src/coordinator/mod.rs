//! Request-lifecycle coordination.
//!
//! Correlates an arbitrary number of concurrently waiting callers to the
//! right future result: a bounded pending queue, an in-progress set keyed
//! by URL, one-shot completions, and a timeout reaper over both
//! collections.

mod error;
mod in_progress;
mod pending;
mod reaper;
mod request;

pub use error::LoadError;
pub use in_progress::InProgressSet;
pub use pending::PendingQueue;
pub use reaper::spawn_reaper;
pub use request::{CompletionRx, LoadResult, PageRequest, TaskDescriptor, TaskPayload};

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::shutdown::{Lifecycle, LifecycleState, ShutdownResult};
use crate::telemetry;
use crate::RelayConfig;

/// The coordinator façade: `submit` (enqueue + await), `pull` (dispatch),
/// `complete` (correlate), plus the reaper tick and teardown.
///
/// Owns both collections exclusively; callers hold only a completion
/// receiver, workers only a task descriptor.
pub struct Coordinator {
    pending: PendingQueue,
    in_progress: InProgressSet,
    next_id: AtomicU64,
    config: RelayConfig,
    lifecycle: Lifecycle,
}

impl Coordinator {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            pending: PendingQueue::new(config.queue_capacity),
            in_progress: InProgressSet::new(),
            next_id: AtomicU64::new(1),
            config,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Submit a page-load request and suspend until it resolves.
    ///
    /// Rejects empty URLs and full queues before any entry is created;
    /// otherwise the caller parks on its completion until a worker result,
    /// a timeout, or teardown resolves it.
    pub async fn submit(&self, url: &str, payload: TaskPayload) -> LoadResult {
        if url.trim().is_empty() {
            return Err(self.reject(url, LoadError::InvalidUrl("url must not be empty".to_string())));
        }
        let Some(_guard) = self.lifecycle.track() else {
            return Err(self.reject(url, LoadError::Internal("coordinator is shutting down".to_string())));
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let rx = match self.pending.enqueue(id, url.to_string(), payload) {
            Ok((position, rx)) => {
                tracing::debug!(id, url, position, "request queued");
                telemetry::record_submit_accepted();
                telemetry::record_queue_depth(self.pending.len(), self.in_progress.len());
                rx
            }
            Err(err) => return Err(self.reject(url, err)),
        };

        match rx.await {
            Ok(result) => result,
            // Sender dropped without resolving. Only reachable if the
            // coordinator itself is torn down mid-flight.
            Err(_) => Err(LoadError::Internal("completion dropped before resolution".to_string())),
        }
    }

    /// Hand the oldest pending request to a worker.
    ///
    /// Non-blocking; `None` means no work right now, not an error. Any
    /// worker may pull; the coordinator never pins a request to a worker.
    pub fn pull(&self) -> Option<TaskDescriptor> {
        if self.lifecycle.state() == LifecycleState::Stopped {
            return None;
        }
        let request = self.pending.dequeue_oldest()?;
        let descriptor = request.descriptor();
        tracing::debug!(id = request.id, url = %request.url, "request dispatched");
        self.in_progress.add(request);

        // Teardown may sweep both collections between the dequeue and the
        // insert above. Re-check after inserting: either the sweep saw the
        // request in the in-progress set, or this path sees Stopped and
        // fails it here, so a dispatch racing shutdown cannot strand its
        // caller.
        if self.lifecycle.state() == LifecycleState::Stopped {
            for request in self.in_progress.remove_matching(&descriptor.url) {
                request.resolve(Err(LoadError::Internal("coordinator is shutting down".to_string())));
            }
            return None;
        }

        telemetry::record_dispatch();
        telemetry::record_queue_depth(self.pending.len(), self.in_progress.len());
        Some(descriptor)
    }

    /// Deliver a rendered result for `url`.
    ///
    /// Resolves and removes every in-progress request sharing the URL (or
    /// only the oldest one when duplicate coalescing is disabled). An
    /// unmatched URL is a silent no-op: a result may legitimately arrive
    /// after the reaper already timed the request out.
    pub fn complete(&self, url: &str, html: String) {
        let matches = if self.config.coalesce_duplicates {
            self.in_progress.remove_matching(url)
        } else {
            self.in_progress.remove_oldest_matching(url).into_iter().collect()
        };

        if matches.is_empty() {
            tracing::debug!(url, "unmatched result discarded");
            telemetry::record_unmatched_result();
            return;
        }

        tracing::debug!(url, resolved = matches.len(), "result correlated");
        telemetry::record_completion(matches.len());
        for request in matches {
            request.resolve(Ok(html.clone()));
        }
        telemetry::record_queue_depth(self.pending.len(), self.in_progress.len());
    }

    /// One reaper tick: fail everything older than `max_wait` in either
    /// collection. The cutoff is computed once so all entries timed out in
    /// a tick share a consistent age boundary.
    pub fn reap_expired(&self) {
        let Some(cutoff) = Instant::now().checked_sub(self.config.max_wait) else {
            // Process younger than max_wait; nothing can be expired yet.
            return;
        };

        let queued = self.pending.drain_expired(cutoff);
        let dispatched = self.in_progress.drain_expired(cutoff);
        if queued.is_empty() && dispatched.is_empty() {
            return;
        }

        telemetry::record_timeouts(queued.len(), dispatched.len());
        for request in queued.into_iter().chain(dispatched) {
            tracing::warn!(id = request.id, url = %request.url, "request timed out");
            request.resolve(Err(LoadError::Timeout { max_wait: self.config.max_wait }));
        }
        telemetry::record_queue_depth(self.pending.len(), self.in_progress.len());
    }

    /// Stop accepting submissions, wait for in-flight callers to drain,
    /// then fail anything still sitting in either collection so no caller
    /// stays suspended forever.
    pub async fn shutdown(&self, timeout: Duration) -> ShutdownResult {
        tracing::info!(in_flight = self.lifecycle.in_flight_count(), "coordinator draining");
        let result = self.lifecycle.initiate(timeout).await;

        let stranded = self
            .pending
            .drain_all()
            .into_iter()
            .chain(self.in_progress.drain_all());
        for request in stranded {
            request.resolve(Err(LoadError::Internal("coordinator is shutting down".to_string())));
        }
        result
    }

    /// Log and count a rejected submission, at warn level for caller
    /// faults and error level for coordinator faults.
    fn reject(&self, url: &str, err: LoadError) -> LoadError {
        if err.is_warning() {
            tracing::warn!(url, error = %err, "submission rejected");
        } else {
            tracing::error!(url, error = %err, "submission rejected");
        }
        telemetry::record_submit_rejected(err.kind());
        err
    }

    /// Number of requests waiting for dispatch.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of requests dispatched but unresolved.
    pub fn in_progress_len(&self) -> usize {
        self.in_progress.len()
    }
}
