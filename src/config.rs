// src/config.rs

//! Configuration types for the token bucket

// dependencies
use crate::errors::TokenBucketError;

/// Configuration for token bucket behavior
#[derive(Debug, Clone)]
pub struct TokenBucketConfig {
    pub(crate) capacity: u64,
    pub(crate) refill_rate: f64,
}

impl TokenBucketConfig {
    /// Create a new configuration with capacity and refill rate (tokens per second)
    pub fn new(capacity: u64, refill_rate: f64) -> Self {
        Self {
            capacity,
            refill_rate,
        }
    }

    /// Builder-style: set capacity
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder-style: set refill rate
    pub fn refill_rate(mut self, refill_rate: f64) -> Self {
        self.refill_rate = refill_rate;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), TokenBucketError> {
        if self.capacity == 0 {
            return Err(TokenBucketError::InvalidCapacity);
        }
        if !self.refill_rate.is_finite() || self.refill_rate <= 0.0 {
            return Err(TokenBucketError::InvalidRefillRate {
                rate: self.refill_rate,
            });
        }
        Ok(())
    }
}
