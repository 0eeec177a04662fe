//! Telemetry for the relay: structured logging plus a metrics facade.

mod logging;
mod metrics;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use metrics::{
    record_completion, record_dispatch, record_queue_depth, record_submit_accepted,
    record_submit_rejected, record_timeouts, record_unmatched_result,
};
