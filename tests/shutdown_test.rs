//! Tests for graceful teardown: draining, stranded callers, admission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use render_relay::coordinator::{LoadError, TaskPayload};
use render_relay::shutdown::ShutdownResult;
use render_relay::{Relay, RelayConfig};

fn config() -> RelayConfig {
    RelayConfig {
        queue_capacity: 10,
        max_wait: Duration::from_secs(60),
        reaper_interval: Duration::from_secs(60),
        coalesce_duplicates: true,
    }
}

#[tokio::test]
async fn idle_relay_shuts_down_cleanly() {
    let relay = Relay::new(config());
    let result = relay.shutdown(Duration::from_millis(100)).await;
    assert_eq!(result, ShutdownResult::Complete);
}

#[tokio::test]
async fn stranded_caller_fails_instead_of_hanging() {
    let relay = Arc::new(Relay::new(config()));

    let caller = {
        let relay = Arc::clone(&relay);
        tokio::spawn(async move { relay.submit("stranded", TaskPayload::default()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // No worker ever pulls; the drain window expires with one caller stuck.
    let result = relay.shutdown(Duration::from_millis(50)).await;
    assert_eq!(result, ShutdownResult::Timeout { remaining: 1 });

    // Teardown resolved the stranded caller with an internal failure.
    let err = caller.await.unwrap().unwrap_err();
    assert!(matches!(err, LoadError::Internal(_)));
}

#[tokio::test]
async fn submit_rejected_after_shutdown() {
    let relay = Relay::new(config());
    relay.shutdown(Duration::from_millis(50)).await;

    let err = relay.submit("nope", TaskPayload::default()).await.unwrap_err();
    assert!(matches!(err, LoadError::Internal(_)));
}

#[tokio::test]
async fn pull_returns_none_after_shutdown() {
    let relay = Relay::new(config());
    relay.shutdown(Duration::from_millis(50)).await;
    assert!(relay.pull().is_none());
}

/// Callers keep submitting while workers keep pulling and teardown fires
/// in the middle. Every caller must resolve one way or another; a dispatch
/// in flight during the final sweep must not strand its submitter.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_caller_left_suspended_when_pull_races_teardown() {
    let relay = Arc::new(Relay::new(config()));
    let stop = Arc::new(AtomicBool::new(false));

    let mut callers = Vec::new();
    for i in 0..8 {
        let relay = Arc::clone(&relay);
        callers.push(tokio::spawn(async move {
            relay.submit(&format!("race-{i}"), TaskPayload::default()).await
        }));
    }

    let mut pullers = Vec::new();
    for _ in 0..2 {
        let relay = Arc::clone(&relay);
        let stop = Arc::clone(&stop);
        pullers.push(tokio::spawn(async move {
            while !stop.load(Ordering::SeqCst) {
                relay.pull();
                tokio::task::yield_now().await;
            }
        }));
    }

    tokio::time::sleep(Duration::from_millis(10)).await;
    relay.shutdown(Duration::from_millis(50)).await;
    stop.store(true, Ordering::SeqCst);

    for caller in callers {
        // A hang here means a request slipped past the teardown sweep.
        let outcome = tokio::time::timeout(Duration::from_secs(2), caller)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(outcome, Err(LoadError::Internal(_))));
    }
    for puller in pullers {
        puller.await.unwrap();
    }
}

#[tokio::test]
async fn worker_result_during_drain_completes_the_caller() {
    let relay = Arc::new(Relay::new(config()));

    let caller = {
        let relay = Arc::clone(&relay);
        tokio::spawn(async move { relay.submit("draining", TaskPayload::default()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(relay.pull().is_some());

    // Worker finishes while the drain window is open.
    let worker = {
        let relay = Arc::clone(&relay);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            relay.complete("draining", "<html>done</html>".to_string());
        })
    };

    let result = relay.shutdown(Duration::from_millis(500)).await;
    assert_eq!(result, ShutdownResult::Complete);
    assert_eq!(caller.await.unwrap(), Ok("<html>done</html>".to_string()));
    worker.await.unwrap();
}
