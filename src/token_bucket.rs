// src/token_bucket.rs

// token bucket: a rate limiter with a continuously replenished token balance

// dependencies
use crate::clock::{Clock, MonotonicClock};
use crate::config::TokenBucketConfig;
use crate::errors::TokenBucketError;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

// mutable bucket state, only ever touched under the bucket's lock
#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill_nanos: u64,
    last_request_nanos: u64, // idle tracking, untouched by balance queries
    clock_regressed: bool,
}

/// The main TokenBucket model.
/// C is the clock type, defaulting to MonotonicClock.
/// Refill and the admit/deny decision happen inside one critical section,
/// so concurrent callers never observe a half-updated balance.
#[derive(Debug)]
pub struct TokenBucket<C = MonotonicClock>
where
    C: Clock,
{
    capacity: u64,
    refill_rate: f64,
    state: Mutex<BucketState>,
    clock: C,
}

impl TokenBucket<MonotonicClock> {
    /// Create a full bucket driven by the monotonic system clock.
    pub fn new(capacity: u64, refill_rate: f64) -> Result<Self, TokenBucketError> {
        Self::with_config(
            TokenBucketConfig::new(capacity, refill_rate),
            MonotonicClock::new(),
        )
    }
}

// methods for the TokenBucket type
impl<C> TokenBucket<C>
where
    C: Clock,
{
    // method to create a new bucket from a config object, starting full
    pub fn with_config(config: TokenBucketConfig, clock: C) -> Result<Self, TokenBucketError> {
        config.validate()?;
        let now = clock.now()?;

        debug!(
            capacity = config.capacity,
            refill_rate = config.refill_rate,
            "token bucket created"
        );

        Ok(Self {
            capacity: config.capacity,
            refill_rate: config.refill_rate,
            state: Mutex::new(BucketState {
                tokens: config.capacity as f64,
                last_refill_nanos: now,
                last_request_nanos: now,
                clock_regressed: false,
            }),
            clock,
        })
    }

    // accessor method to return the capacity field
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    // accessor method to return the refill rate in tokens per second
    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Try to take `tokens` from the bucket. Returns `Ok(false)` when the
    /// balance is too low; a denial is not an error.
    pub fn allow_request(&self, tokens: u32) -> Result<bool, TokenBucketError> {
        self.check_request(tokens).map(|decision| decision.allowed)
    }

    /// Same admission step as [`allow_request`](Self::allow_request), with
    /// metadata describing the outcome.
    pub fn check_request(&self, tokens: u32) -> Result<TokenBucketDecision, TokenBucketError> {
        if tokens == 0 {
            return Err(TokenBucketError::InvalidTokenCount);
        }
        let requested = f64::from(tokens);

        let mut state = self.state.lock();
        let now = self.clock.now()?;
        self.refill(&mut state, now);
        state.last_request_nanos = state.last_request_nanos.max(now);

        if state.tokens >= requested {
            state.tokens -= requested;

            Ok(TokenBucketDecision {
                allowed: true,
                remaining_tokens: state.tokens,
                retry_after_seconds: None,
            })
        } else {
            // more than capacity can never be admitted, so there is nothing to wait for
            let retry_after_seconds = (u64::from(tokens) <= self.capacity)
                .then(|| (requested - state.tokens) / self.refill_rate);

            trace!(
                requested = tokens,
                available = state.tokens,
                "token bucket denied request"
            );

            Ok(TokenBucketDecision {
                allowed: false,
                remaining_tokens: state.tokens,
                retry_after_seconds,
            })
        }
    }

    /// Refill and report the balance without consuming anything.
    /// Does not count as activity for idle-client cleanup.
    pub fn current_tokens(&self) -> Result<f64, TokenBucketError> {
        let mut state = self.state.lock();
        let now = self.clock.now()?;
        self.refill(&mut state, now);
        Ok(state.tokens)
    }

    // refill at `now` and report (balance, last request time) under one lock
    pub(crate) fn idle_snapshot(&self, now: u64) -> (f64, u64) {
        let mut state = self.state.lock();
        self.refill(&mut state, now);
        (state.tokens, state.last_request_nanos)
    }

    // credit elapsed time since the last refill, capped at capacity
    fn refill(&self, state: &mut BucketState, now: u64) {
        if now < state.last_refill_nanos {
            // keep the later timestamp so the interval is not credited twice;
            // warn once per regression, not on every call until it catches up
            if !state.clock_regressed {
                warn!(
                    now,
                    last_refill = state.last_refill_nanos,
                    "clock moved backwards, skipping refill"
                );
                state.clock_regressed = true;
            }
            return;
        }
        state.clock_regressed = false;

        let elapsed_seconds = (now - state.last_refill_nanos) as f64 / NANOS_PER_SECOND;
        let tokens_to_add = elapsed_seconds * self.refill_rate;
        state.tokens = (state.tokens + tokens_to_add).min(self.capacity as f64);
        state.last_refill_nanos = now;
    }
}

/// Result of a token bucket admission check
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBucketDecision {
    /// Whether the request was admitted and its tokens deducted
    pub allowed: bool,
    /// Balance left after the decision
    pub remaining_tokens: f64,
    /// Seconds until enough tokens will have accrued (when denied).
    /// `None` if admitted, or if the request exceeds capacity.
    pub retry_after_seconds: Option<f64>,
}
