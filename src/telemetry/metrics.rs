//! Metric recording helpers over the `metrics` facade.
//!
//! Call sites stay one-liners; whichever recorder the embedding process
//! installs receives the values. With no recorder installed these are
//! no-ops.

use metrics::{counter, gauge};

/// Depth of both coordinator collections, refreshed after every mutation.
pub fn record_queue_depth(pending: usize, in_progress: usize) {
    gauge!("relay_pending_depth").set(pending as f64);
    gauge!("relay_in_progress_depth").set(in_progress as f64);
}

pub fn record_submit_accepted() {
    counter!("relay_submissions", "outcome" => "accepted").increment(1);
}

pub fn record_submit_rejected(reason: &'static str) {
    counter!("relay_submissions", "outcome" => "rejected", "reason" => reason).increment(1);
}

pub fn record_dispatch() {
    counter!("relay_dispatches").increment(1);
}

/// `matched` counts the completions resolved by one worker result; greater
/// than one when duplicate URLs coalesce.
pub fn record_completion(matched: usize) {
    counter!("relay_completions").increment(matched as u64);
}

pub fn record_unmatched_result() {
    counter!("relay_unmatched_results").increment(1);
}

pub fn record_timeouts(queued: usize, dispatched: usize) {
    if queued > 0 {
        counter!("relay_timeouts", "stage" => "queued").increment(queued as u64);
    }
    if dispatched > 0 {
        counter!("relay_timeouts", "stage" => "dispatched").increment(dispatched as u64);
    }
}
