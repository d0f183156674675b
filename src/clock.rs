// src/clock.rs

// clock module definition and implementations

// dependencies
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// Clock trait to abstract time retrieval.
/// Implementors must be thread-safe (Send + Sync) and should never move
/// backwards; the token bucket treats a backwards step as zero elapsed time.
/// The `now` method returns a reading in nanoseconds relative to an
/// arbitrary, fixed origin.
pub trait Clock: Send + Sync {
    fn now(&self) -> Result<u64, ClockError>;
}

/// Clock error type
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("time source unavailable")]
    ClockUnavailable,
}

/// Monotonic clock backed by `std::time::Instant`.
/// Readings are nanoseconds since the clock was created, so they are
/// unaffected by wall-clock adjustments. Clones share the same origin.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Result<u64, ClockError> {
        // u64 nanoseconds covers ~584 years of uptime
        Ok(self.origin.elapsed().as_nanos() as u64)
    }
}

/// Manually driven clock for deterministic tests of time-dependent code.
/// Starts at a fixed reading and only moves when told to; it can be moved
/// backwards and made to fail its next reading. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Arc<AtomicU64>, // Store as nanos
    should_fail: Arc<AtomicBool>,
}

impl ManualClock {
    pub fn new(initial_seconds: f64) -> Self {
        Self {
            time: Arc::new(AtomicU64::new((initial_seconds * 1_000_000_000.0) as u64)),
            should_fail: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn advance(&self, seconds: f64) {
        let nanos = (seconds * 1_000_000_000.0) as u64;
        self.time.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn set_time(&self, seconds: f64) {
        let nanos = (seconds * 1_000_000_000.0) as u64;
        self.time.store(nanos, Ordering::Relaxed);
    }

    /// Make the next call to `now()` return an error
    pub fn fail_next_call(&self) {
        self.should_fail.store(true, Ordering::Relaxed);
    }

    // current reading as seconds, for assertions
    pub fn now_seconds(&self) -> f64 {
        self.time.load(Ordering::Relaxed) as f64 / 1_000_000_000.0
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<u64, ClockError> {
        if self.should_fail.swap(false, Ordering::Relaxed) {
            Err(ClockError::ClockUnavailable)
        } else {
            Ok(self.time.load(Ordering::Relaxed))
        }
    }
}
