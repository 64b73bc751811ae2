//! # Queue Error Types
//!
//! Failures raised synchronously by a queue when it refuses a chain. The
//! chain scheduler treats every variant the same way: the batch is counted as
//! failed-to-schedule and the run continues.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue is closed and no longer accepts chains")]
    Closed,

    #[error("Queue capacity exceeded: {pending} pending chains, limit is {limit}")]
    CapacityExceeded { pending: usize, limit: usize },

    #[error("Chain already expired at submission: expires at {expires_at}")]
    AlreadyExpired { expires_at: String },

    #[error("Broker error: {operation}: {message}")]
    Broker { operation: String, message: String },
}

impl QueueError {
    pub fn closed() -> Self {
        Self::Closed
    }

    pub fn capacity_exceeded(pending: usize, limit: usize) -> Self {
        Self::CapacityExceeded { pending, limit }
    }

    pub fn broker(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Broker {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
