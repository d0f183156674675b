// src/bounded_queue.rs

// bounded blocking queue: a fixed-capacity FIFO ring buffer with backpressure

// dependencies
use crate::errors::{EnqueueError, QueueError};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// which condition a blocked caller is waiting on
#[derive(Debug, Clone, Copy)]
enum Waiting {
    ForSpace,
    ForItem,
}

// ring buffer plus waiter bookkeeping, only ever touched under the queue's lock
struct QueueState<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    len: usize,
    interrupt_epoch: u64,
    blocked_producers: usize,
    blocked_consumers: usize,
}

impl<T> QueueState<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            tail: 0,
            len: 0,
            interrupt_epoch: 0,
            blocked_producers: 0,
            blocked_consumers: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    fn blocks(&self, waiting: Waiting) -> bool {
        match waiting {
            Waiting::ForSpace => self.is_full(),
            Waiting::ForItem => self.len == 0,
        }
    }

    fn waiters_mut(&mut self, waiting: Waiting) -> &mut usize {
        match waiting {
            Waiting::ForSpace => &mut self.blocked_producers,
            Waiting::ForItem => &mut self.blocked_consumers,
        }
    }

    // caller guarantees the queue is not full
    fn push(&mut self, message: T) {
        debug_assert!(!self.is_full());
        self.slots[self.tail] = Some(message);
        self.tail = (self.tail + 1) % self.capacity();
        self.len += 1;
    }

    // take() leaves the slot empty so the queue holds no stale reference
    fn pop(&mut self) -> Option<T> {
        let message = self.slots[self.head].take()?;
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Some(message)
    }
}

/// A thread-safe, fixed-capacity FIFO queue.
///
/// Producers block in [`enqueue`](Self::enqueue) while the queue is full and
/// consumers block in [`dequeue`](Self::dequeue) while it is empty. Every
/// state transition wakes all waiters of the relevant kind; each waiter
/// re-checks its condition under the lock before proceeding.
///
/// Blocking calls can be bounded with the `*_timeout` variants, avoided with
/// the `try_*` variants, or aborted with [`interrupt`](Self::interrupt). A
/// failed enqueue always hands the message back.
pub struct BoundedQueue<T> {
    capacity: usize,
    state: Mutex<QueueState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Create an empty queue holding at most `capacity` messages.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity);
        }

        debug!(capacity, "bounded queue created");

        Ok(Self {
            capacity,
            state: Mutex::new(QueueState::with_capacity(capacity)),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    /// Append `message`, blocking while the queue is full.
    pub fn enqueue(&self, message: T) -> Result<(), EnqueueError<T>> {
        self.enqueue_until(message, None)
    }

    /// Like [`enqueue`](Self::enqueue), but gives up with
    /// [`QueueError::TimedOut`] once `timeout` has passed.
    pub fn enqueue_timeout(&self, message: T, timeout: Duration) -> Result<(), EnqueueError<T>> {
        self.enqueue_until(message, Instant::now().checked_add(timeout))
    }

    /// Append `message` only if there is room right now.
    pub fn try_enqueue(&self, message: T) -> Result<(), EnqueueError<T>> {
        let mut state = self.state.lock();
        if state.is_full() {
            return Err(EnqueueError::new(QueueError::Full, message));
        }
        state.push(message);
        self.not_empty.notify_all();
        Ok(())
    }

    /// Remove the oldest message, blocking while the queue is empty.
    pub fn dequeue(&self) -> Result<T, QueueError> {
        self.dequeue_until(None)
    }

    /// Like [`dequeue`](Self::dequeue), but gives up with
    /// [`QueueError::TimedOut`] once `timeout` has passed.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
        self.dequeue_until(Instant::now().checked_add(timeout))
    }

    /// Remove the oldest message only if one is available right now.
    pub fn try_dequeue(&self) -> Result<T, QueueError> {
        let mut state = self.state.lock();
        let message = state.pop().ok_or(QueueError::Empty)?;
        self.not_full.notify_all();
        Ok(message)
    }

    /// Abort every wait currently in progress on this queue.
    ///
    /// Each blocked producer and consumer returns [`QueueError::Interrupted`]
    /// without touching the buffer. Calls that start waiting afterwards are
    /// unaffected.
    pub fn interrupt(&self) {
        let mut state = self.state.lock();
        state.interrupt_epoch = state.interrupt_epoch.wrapping_add(1);

        debug!(
            blocked_producers = state.blocked_producers,
            blocked_consumers = state.blocked_consumers,
            "interrupting queue waiters"
        );

        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub fn len(&self) -> usize {
        self.state.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().len == 0
    }

    pub fn is_full(&self) -> bool {
        self.state.lock().is_full()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of producers currently blocked waiting for space.
    pub fn blocked_producers(&self) -> usize {
        self.state.lock().blocked_producers
    }

    /// Number of consumers currently blocked waiting for a message.
    pub fn blocked_consumers(&self) -> usize {
        self.state.lock().blocked_consumers
    }

    fn enqueue_until(&self, message: T, deadline: Option<Instant>) -> Result<(), EnqueueError<T>> {
        let mut state = self.state.lock();
        if let Err(kind) = self.wait_for(&mut state, Waiting::ForSpace, deadline) {
            return Err(EnqueueError::new(kind, message));
        }
        state.push(message);
        self.not_empty.notify_all();
        Ok(())
    }

    fn dequeue_until(&self, deadline: Option<Instant>) -> Result<T, QueueError> {
        let mut state = self.state.lock();
        self.wait_for(&mut state, Waiting::ForItem, deadline)?;
        let message = state.pop().ok_or(QueueError::Empty)?;
        self.not_full.notify_all();
        Ok(message)
    }

    // Block until `waiting` is satisfied, the deadline passes, or an
    // interrupt arrives. The lock is released while parked and the
    // condition is re-checked after every wakeup.
    fn wait_for(
        &self,
        state: &mut MutexGuard<'_, QueueState<T>>,
        waiting: Waiting,
        deadline: Option<Instant>,
    ) -> Result<(), QueueError> {
        if !state.blocks(waiting) {
            return Ok(());
        }

        let condvar = match waiting {
            Waiting::ForSpace => &self.not_full,
            Waiting::ForItem => &self.not_empty,
        };
        let epoch = state.interrupt_epoch;

        trace!(?waiting, "blocking on queue");
        *state.waiters_mut(waiting) += 1;

        let outcome = loop {
            let timed_out = match deadline {
                Some(deadline) => condvar.wait_until(state, deadline).timed_out(),
                None => {
                    condvar.wait(state);
                    false
                }
            };

            if state.interrupt_epoch != epoch {
                break Err(QueueError::Interrupted);
            }
            if !state.blocks(waiting) {
                break Ok(());
            }
            if timed_out {
                break Err(QueueError::TimedOut);
            }
        };

        *state.waiters_mut(waiting) -= 1;
        if let Err(error) = outcome {
            trace!(?waiting, %error, "queue wait aborted");
        }
        outcome
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
