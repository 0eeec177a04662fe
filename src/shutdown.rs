//! Graceful teardown coordination.
//!
//! A small state machine: stop accepting new submissions, give in-flight
//! callers a drain window, then report whether everyone got out.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    Draining,
    Stopped,
}

/// Outcome of a drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownResult {
    Complete,
    Timeout { remaining: u32 },
}

/// Tracks in-flight callers and gates admission during teardown.
pub struct Lifecycle {
    state: RwLock<LifecycleState>,
    in_flight: AtomicU32,
    notify: Notify,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LifecycleState::Running),
            in_flight: AtomicU32::new(0),
            notify: Notify::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    pub fn is_accepting(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Count one caller as in-flight. Returns None once draining has
    /// begun. A guard handed out just before the Draining flip is still
    /// counted and drained correctly.
    pub fn track(&self) -> Option<InFlightGuard<'_>> {
        if !self.is_accepting() {
            return None;
        }
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        Some(InFlightGuard { lifecycle: self })
    }

    pub fn in_flight_count(&self) -> u32 {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Stop accepting, give in-flight callers up to `timeout` to finish,
    /// then mark stopped.
    pub async fn initiate(&self, timeout: Duration) -> ShutdownResult {
        *self.state.write() = LifecycleState::Draining;
        let drained = tokio::time::timeout(timeout, self.drained()).await.is_ok();
        *self.state.write() = LifecycleState::Stopped;

        if drained {
            return ShutdownResult::Complete;
        }
        match self.in_flight_count() {
            // The last guard dropped right as the window closed.
            0 => ShutdownResult::Complete,
            remaining => ShutdownResult::Timeout { remaining },
        }
    }

    /// Resolves once the in-flight count reaches zero.
    ///
    /// Guards notify after decrementing, and `notify_one` stores a permit
    /// when nobody is parked yet, so a guard dropped between the count
    /// check and the await cannot be missed.
    async fn drained(&self) {
        while self.in_flight_count() > 0 {
            self.notify.notified().await;
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps one caller counted until dropped; wakes the drain on drop.
pub struct InFlightGuard<'a> {
    lifecycle: &'a Lifecycle,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.lifecycle.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.lifecycle.notify.notify_one();
    }
}
