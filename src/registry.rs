// src/registry.rs

// per-client token buckets for request throttling layers

// dependencies
use crate::clock::{Clock, MonotonicClock};
use crate::config::TokenBucketConfig;
use crate::errors::TokenBucketError;
use crate::token_bucket::{TokenBucket, TokenBucketDecision};
use dashmap::DashMap;
use std::hash::Hash;
use tracing::debug;

/// One token bucket per client.
/// K is the type used to identify clients (e.g., String, u64, etc.).
/// C is the clock type, defaulting to MonotonicClock; every bucket gets a
/// clone of it, so clones must share the same time origin.
/// Buckets live in a `DashMap` for sharded concurrent access, and each one
/// keeps its own lock so admission stays atomic per client.
#[derive(Debug)]
pub struct TokenBucketRegistry<K, C = MonotonicClock>
where
    K: Hash + Eq,
    C: Clock,
{
    config: TokenBucketConfig,
    buckets: DashMap<K, TokenBucket<C>>,
    clock: C,
}

impl<K> TokenBucketRegistry<K, MonotonicClock>
where
    K: Hash + Eq,
{
    /// Create a registry whose buckets share the monotonic system clock.
    pub fn new(capacity: u64, refill_rate: f64) -> Result<Self, TokenBucketError> {
        Self::with_config(
            TokenBucketConfig::new(capacity, refill_rate),
            MonotonicClock::new(),
        )
    }
}

// methods for the TokenBucketRegistry type
impl<K, C> TokenBucketRegistry<K, C>
where
    K: Hash + Eq,
    C: Clock + Clone,
{
    // method to create a new registry from a config object
    pub fn with_config(config: TokenBucketConfig, clock: C) -> Result<Self, TokenBucketError> {
        config.validate()?;

        debug!(
            capacity = config.capacity,
            refill_rate = config.refill_rate,
            "token bucket registry created"
        );

        Ok(Self {
            config,
            buckets: DashMap::new(),
            clock,
        })
    }

    /// Take `tokens` from the client's bucket, creating a full bucket on first use.
    pub fn allow_request(&self, client_id: K, tokens: u32) -> Result<bool, TokenBucketError> {
        self.check_request(client_id, tokens)
            .map(|decision| decision.allowed)
    }

    pub fn check_request(
        &self,
        client_id: K,
        tokens: u32,
    ) -> Result<TokenBucketDecision, TokenBucketError> {
        // reject before a bucket gets created for the client
        if tokens == 0 {
            return Err(TokenBucketError::InvalidTokenCount);
        }

        let bucket = match self.buckets.get(&client_id) {
            Some(bucket) => bucket,
            None => {
                let fresh = TokenBucket::with_config(self.config.clone(), self.clock.clone())?;
                self.buckets.entry(client_id).or_insert(fresh).downgrade()
            }
        };
        bucket.check_request(tokens)
    }

    /// Current balance for a known client, `None` if the client has no bucket.
    /// Reading the balance is not activity: a client that is only polled
    /// still becomes eligible for [`cleanup_idle_clients`](Self::cleanup_idle_clients).
    pub fn current_tokens(&self, client_id: &K) -> Result<Option<f64>, TokenBucketError> {
        self.buckets
            .get(client_id)
            .map(|bucket| bucket.current_tokens())
            .transpose()
    }

    // method to drop clients with no request for at least `max_idle_nanos`
    // whose bucket has refilled to capacity; returns how many were removed.
    // Such a client is indistinguishable from a new one, so removal never
    // hands a throttled client a fresh bucket.
    pub fn cleanup_idle_clients(&self, max_idle_nanos: u64) -> Result<usize, TokenBucketError> {
        let current_time_nanos = self.clock.now()?;
        let mut removed = 0;

        self.buckets.retain(|_, bucket| {
            let (tokens, last_request_nanos) = bucket.idle_snapshot(current_time_nanos);
            let idle = current_time_nanos.saturating_sub(last_request_nanos) >= max_idle_nanos;
            let refilled = tokens >= bucket.capacity() as f64;
            let keep = !(idle && refilled);
            if !keep {
                removed += 1;
            }
            keep
        });

        debug!(removed, remaining = self.buckets.len(), "idle clients cleaned up");
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
