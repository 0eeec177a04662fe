//! Render Relay
//!
//! Bridges synchronous "load this URL and give me the rendered HTML"
//! callers with pull-based render workers. Callers submit and suspend;
//! workers poll for the next unclaimed request and later push results
//! back by URL.
//!
//! # Architecture
//!
//! - **PendingQueue**: bounded FIFO of not-yet-dispatched requests
//! - **InProgressSet**: dispatched-but-unresolved requests, searchable by URL
//! - **Completion**: one-shot slot per request, first writer wins
//! - **Reaper**: periodic sweep failing entries older than the wait budget
//!
//! All state is in-memory and ephemeral. The HTTP transport and the
//! worker-side browser automation are external collaborators; this crate
//! is the coordination core they call into (`submit`, `pull`, `complete`).

pub mod config;
pub mod coordinator;
pub mod shutdown;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use coordinator::{spawn_reaper, Coordinator, LoadResult, TaskDescriptor, TaskPayload};
use shutdown::ShutdownResult;

/// Relay configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximum number of queued-but-undispatched requests.
    pub queue_capacity: usize,
    /// Wait budget per request, across both queued and dispatched states.
    pub max_wait: Duration,
    /// Reaper sweep period, independent of `max_wait`.
    pub reaper_interval: Duration,
    /// When true (the observed upstream contract), one worker result
    /// resolves every in-progress request sharing the URL. When false,
    /// only the oldest match resolves.
    pub coalesce_duplicates: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10,
            max_wait: Duration::from_secs(30),
            reaper_interval: Duration::from_secs(2),
            coalesce_duplicates: true,
        }
    }
}

/// The relay instance: the coordinator plus its background reaper.
///
/// Must be created inside a tokio runtime (the reaper is spawned at
/// construction).
pub struct Relay {
    coordinator: Arc<Coordinator>,
    reaper: Mutex<Option<JoinHandle<()>>>,
    reaper_token: CancellationToken,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        let reaper_interval = config.reaper_interval;
        let coordinator = Arc::new(Coordinator::new(config));
        let reaper_token = CancellationToken::new();
        let reaper = spawn_reaper(Arc::clone(&coordinator), reaper_interval, reaper_token.clone());
        Self { coordinator, reaper: Mutex::new(Some(reaper)), reaper_token }
    }

    /// Submit a page-load request and suspend until it resolves.
    pub async fn submit(&self, url: &str, payload: TaskPayload) -> LoadResult {
        self.coordinator.submit(url, payload).await
    }

    /// Hand the oldest pending request to a worker; `None` when idle.
    pub fn pull(&self) -> Option<TaskDescriptor> {
        self.coordinator.pull()
    }

    /// Deliver a rendered result for `url`. Unmatched results are dropped.
    pub fn complete(&self, url: &str, html: String) {
        self.coordinator.complete(url, html)
    }

    /// Access the coordinator directly (e.g. for transport adapters).
    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Graceful teardown: drain in-flight callers within `timeout`, fail
    /// anything stranded, then stop the reaper.
    pub async fn shutdown(&self, timeout: Duration) -> ShutdownResult {
        let result = self.coordinator.shutdown(timeout).await;
        self.reaper_token.cancel();
        let handle = self.reaper.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        tracing::info!(?result, "relay stopped");
        result
    }
}
