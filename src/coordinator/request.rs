//! Page-load request type and its one-shot completion slot.

use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::error::LoadError;

/// Result delivered to a waiting caller: rendered HTML or a failure.
pub type LoadResult = Result<String, LoadError>;

/// Sender half used to resolve a waiting caller.
pub type CompletionTx = tokio::sync::oneshot::Sender<LoadResult>;
/// Receiver half a caller awaits inside `submit`.
pub type CompletionRx = tokio::sync::oneshot::Receiver<LoadResult>;

/// Rendering hints passed through to the worker unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    /// Selector the worker waits for before capturing the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_selector: Option<String>,
    /// Selector the worker clicks once it appears.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_selector: Option<String>,
}

/// What a worker receives from `pull`: the correlation key plus the
/// pass-through hints. Deliberately omits the completion handle; workers
/// report back through `complete`, never by resolving a caller directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub url: String,
    #[serde(flatten)]
    pub payload: TaskPayload,
}

/// First-writer-wins result slot.
///
/// The oneshot sender is taken exactly once under the lock; later
/// resolution attempts find the slot empty and become no-ops. This is
/// what lets `complete` and the reaper race safely.
pub struct CompletionSlot {
    tx: Mutex<Option<CompletionTx>>,
}

impl CompletionSlot {
    pub fn new() -> (Self, CompletionRx) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        (Self { tx: Mutex::new(Some(tx)) }, rx)
    }

    /// Resolve the slot. Returns true if this call won the race.
    ///
    /// A closed receiver (caller went away) still counts as won: the slot
    /// is consumed and the result dropped.
    pub fn resolve(&self, result: LoadResult) -> bool {
        match self.tx.lock().take() {
            Some(tx) => {
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }
}

/// A request in flight through the coordinator.
///
/// `id` is a process-local counter used for logging; correlation between
/// workers and callers uses `url`, which is not required to be unique
/// among concurrently live requests.
pub struct PageRequest {
    pub id: u64,
    pub url: String,
    pub payload: TaskPayload,
    pub submitted_at: Instant,
    completion: CompletionSlot,
}

impl std::fmt::Debug for PageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRequest")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("submitted_at", &self.submitted_at)
            .finish()
    }
}

impl PageRequest {
    /// Create a request with a fresh completion slot. Returns the receiver
    /// the caller awaits.
    pub fn new(id: u64, url: String, payload: TaskPayload) -> (Self, CompletionRx) {
        let (completion, rx) = CompletionSlot::new();
        let request = Self { id, url, payload, submitted_at: Instant::now(), completion };
        (request, rx)
    }

    /// Worker-facing view of this request.
    pub fn descriptor(&self) -> TaskDescriptor {
        TaskDescriptor { url: self.url.clone(), payload: self.payload.clone() }
    }

    /// True if the request was submitted before the cutoff.
    pub fn expired_by(&self, cutoff: Instant) -> bool {
        self.submitted_at < cutoff
    }

    /// Resolve the caller. Returns true if this call won the race.
    pub fn resolve(&self, result: LoadResult) -> bool {
        self.completion.resolve(result)
    }
}
