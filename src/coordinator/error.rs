//! Caller-facing error types for the relay coordinator.
//!
//! Every failure reaches the waiting caller through the same completion
//! slot used for success, so callers have a single await-and-inspect
//! contract.

use std::time::Duration;

use thiserror::Error;

/// Errors a `submit` call can resolve with.
///
/// `Clone` because one result may fan out to several completions when
/// duplicate URLs are in flight.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Queue full: {current}/{max} pending requests")]
    QueueFull { current: usize, max: usize },

    #[error("Timed out after {}s waiting for a rendered page", .max_wait.as_secs())]
    Timeout { max_wait: Duration },

    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LoadError {
    /// Short stable label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::QueueFull { .. } => "queue_full",
            Self::Timeout { .. } => "timeout",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns true if this error should be logged as a warning rather
    /// than an error (expected under load or caller mistake).
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::QueueFull { .. } | Self::InvalidUrl(_) | Self::Timeout { .. })
    }
}
