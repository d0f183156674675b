// src/errors.rs

// error handling for the queue and token bucket types

// dependencies
use std::fmt;

use crate::clock::ClockError;

/// Error type for BoundedQueue construction and blocking operations.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Queue capacity must be positive")]
    InvalidCapacity, // for capacity == 0
    #[error("Wait on the queue was interrupted")]
    Interrupted,
    #[error("Timed out waiting on the queue")]
    TimedOut,
    #[error("Queue is full")]
    Full,
    #[error("Queue is empty")]
    Empty,
}

/// A failed enqueue. Carries the rejected message back to the caller so
/// nothing is dropped.
#[derive(PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct EnqueueError<T> {
    kind: QueueError,
    message: T,
}

impl<T> EnqueueError<T> {
    pub(crate) fn new(kind: QueueError, message: T) -> Self {
        Self { kind, message }
    }

    /// The reason the enqueue failed.
    pub fn kind(&self) -> QueueError {
        self.kind
    }

    /// Recover the message that could not be enqueued.
    pub fn into_inner(self) -> T {
        self.message
    }
}

// manual impl so T does not need to be Debug
impl<T> fmt::Debug for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnqueueError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Error type for TokenBucket configuration and clock issues.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TokenBucketError {
    #[error("Capacity must be positive")]
    InvalidCapacity, // for capacity == 0
    #[error("Refill rate must be finite and positive, got {rate}")]
    InvalidRefillRate { rate: f64 },
    #[error("Token count must be positive")]
    InvalidTokenCount, // for tokens == 0
    #[error("Clock error occurred: {0}")]
    ClockError(#[from] ClockError),
}
