//! Unordered set of dispatched-but-unresolved requests, searchable by URL.
//!
//! Dispatch order gives no age ordering here, so the timeout sweep scans
//! the whole set. Volumes are tens of items, not millions; a mutex-guarded
//! vec keeps the membership invariant simple.

use std::time::Instant;

use parking_lot::Mutex;

use super::request::PageRequest;

pub struct InProgressSet {
    inner: Mutex<Vec<PageRequest>>,
}

impl InProgressSet {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Vec::new()) }
    }

    pub fn add(&self, request: PageRequest) {
        self.inner.lock().push(request);
    }

    /// Remove and return every request whose URL matches. May return zero,
    /// one, or many entries; duplicate URLs in flight all coalesce onto
    /// the same result.
    pub fn remove_matching(&self, url: &str) -> Vec<PageRequest> {
        let mut set = self.inner.lock();
        let mut matches = Vec::new();
        let mut i = 0;
        while i < set.len() {
            if set[i].url == url {
                matches.push(set.swap_remove(i));
            } else {
                i += 1;
            }
        }
        matches
    }

    /// Remove only the oldest request whose URL matches (strict one-to-one
    /// correlation mode).
    pub fn remove_oldest_matching(&self, url: &str) -> Option<PageRequest> {
        let mut set = self.inner.lock();
        let index = set
            .iter()
            .enumerate()
            .filter(|(_, r)| r.url == url)
            .min_by_key(|(_, r)| r.submitted_at)
            .map(|(i, _)| i)?;
        Some(set.swap_remove(index))
    }

    /// Remove and return every request submitted before the cutoff.
    pub fn drain_expired(&self, cutoff: Instant) -> Vec<PageRequest> {
        let mut set = self.inner.lock();
        let mut expired = Vec::new();
        let mut i = 0;
        while i < set.len() {
            if set[i].expired_by(cutoff) {
                expired.push(set.swap_remove(i));
            } else {
                i += 1;
            }
        }
        expired
    }

    /// Remove everything, regardless of age. Used at teardown.
    pub fn drain_all(&self) -> Vec<PageRequest> {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for InProgressSet {
    fn default() -> Self {
        Self::new()
    }
}
