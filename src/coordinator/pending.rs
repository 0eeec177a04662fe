//! Bounded FIFO queue of not-yet-dispatched requests.
//!
//! Submission order equals age order, so the reaper only ever needs to
//! inspect the head: the first non-expired entry proves everything behind
//! it is fresh too.

use std::collections::VecDeque;
use std::time::Instant;

use parking_lot::Mutex;

use super::error::LoadError;
use super::request::{CompletionRx, PageRequest, TaskPayload};

pub struct PendingQueue {
    inner: Mutex<VecDeque<PageRequest>>,
    capacity: usize,
}

impl PendingQueue {
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(VecDeque::with_capacity(capacity)), capacity }
    }

    /// Enqueue a new request. The request is constructed inside the
    /// capacity check, so no request object ever exists for a rejected
    /// submission. Returns the queue position and the receiver the caller
    /// awaits.
    pub fn enqueue(
        &self,
        id: u64,
        url: String,
        payload: TaskPayload,
    ) -> Result<(usize, CompletionRx), LoadError> {
        let mut queue = self.inner.lock();
        if queue.len() >= self.capacity {
            return Err(LoadError::QueueFull { current: queue.len(), max: self.capacity });
        }
        let (request, rx) = PageRequest::new(id, url, payload);
        let position = queue.len();
        queue.push_back(request);
        Ok((position, rx))
    }

    /// Remove and return the oldest pending request.
    pub fn dequeue_oldest(&self) -> Option<PageRequest> {
        self.inner.lock().pop_front()
    }

    /// Drain expired entries from the front, stopping at the first head
    /// submitted at or after the cutoff. O(expired-count), not O(n).
    pub fn drain_expired(&self, cutoff: Instant) -> Vec<PageRequest> {
        let mut queue = self.inner.lock();
        let mut expired = Vec::new();
        while let Some(head) = queue.front() {
            if !head.expired_by(cutoff) {
                break;
            }
            if let Some(request) = queue.pop_front() {
                expired.push(request);
            }
        }
        expired
    }

    /// Remove everything, regardless of age. Used at teardown.
    pub fn drain_all(&self) -> Vec<PageRequest> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
