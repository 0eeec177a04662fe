//! Periodic sweep that fails requests older than the wait threshold.
//!
//! Runs on a fixed interval independent of request traffic. Resolution is
//! fire-and-forget: the oneshot send never blocks, so a slow caller cannot
//! stall the sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::Coordinator;

/// Spawn the reaper loop. Returns a handle for shutdown.
pub fn spawn_reaper(
    coordinator: Arc<Coordinator>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    tracing::info!("reaper: shutdown signal received");
                    break;
                }
                () = tokio::time::sleep(interval) => {
                    coordinator.reap_expired();
                }
            }
        }
    })
}
