// src/lib.rs

//! # Flux Primitives
//!
//! Two independent concurrency building blocks:
//!
//! - [`BoundedQueue`], a fixed-capacity FIFO with blocking, timed and
//!   non-blocking enqueue/dequeue, for backpressured producer/consumer
//!   pipelines.
//! - [`TokenBucket`], a rate limiter whose balance refills continuously from
//!   a monotonic clock, plus [`TokenBucketRegistry`] for one bucket per client.
//!
//! ## Quick Example
//!
//! ```rust
//! use flux_primitives::{BoundedQueue, TokenBucket};
//!
//! let bucket = TokenBucket::new(5, 2.0).unwrap();
//! let queue = BoundedQueue::new(16).unwrap();
//!
//! for job in 0..8 {
//!     if bucket.allow_request(1).unwrap() {
//!         queue.enqueue(job).unwrap();
//!     } else {
//!         println!("job {job} throttled");
//!     }
//! }
//!
//! assert_eq!(queue.len(), 5);
//! assert_eq!(queue.dequeue().unwrap(), 0);
//! ```

// private modules
mod bounded_queue;
mod clock;
mod config;
mod errors;
mod registry;
mod token_bucket;

// public API exports
pub use bounded_queue::BoundedQueue;
pub use clock::{Clock, ClockError, ManualClock, MonotonicClock};
pub use config::TokenBucketConfig;
pub use errors::{EnqueueError, QueueError, TokenBucketError};
pub use registry::TokenBucketRegistry;
pub use token_bucket::{TokenBucket, TokenBucketDecision};
