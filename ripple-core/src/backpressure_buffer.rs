// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bounded queue between a producer and a slower consumer.

use crate::logging::trace;
use crate::BackpressureConfig;
use parking_lot::Mutex;
use ripple_error::{Result, RippleError};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Buffer capacity used when none is configured explicitly.
pub const DEFAULT_BUFFER_CAPACITY: usize = 128;

/// What a [`BackpressureBuffer`] does with an item that arrives while it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverflowPolicy {
    /// Discard the incoming item; the buffered items keep their order.
    DropIncoming,
    /// Discard everything buffered and keep only the incoming item.
    KeepLatest,
    /// Never overflow: the buffer grows without bound.
    Unbounded,
    /// Refuse the item; the subscription terminates with
    /// [`RippleError::BufferOverflow`] once the buffered items are drained.
    Fail,
}

impl OverflowPolicy {
    /// Returns `true` if overflowing under this policy discards items.
    #[must_use]
    pub const fn is_lossy(self) -> bool {
        matches!(self, Self::DropIncoming | Self::KeepLatest)
    }
}

/// Outcome of [`BackpressureBuffer::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// The item was appended.
    Enqueued,
    /// The buffer was full and the incoming item was discarded.
    Dropped,
    /// The buffer was full; this many buffered items were discarded and the
    /// incoming item was kept.
    Replaced(usize),
    /// The buffer was full and the policy is [`OverflowPolicy::Fail`].
    Overflowed,
}

/// Bounded FIFO queue with an overflow policy and a loss counter.
///
/// The lock is held only for the queue operation itself.
///
/// ```
/// use ripple_core::{BackpressureBuffer, Offer, OverflowPolicy};
///
/// let buffer = BackpressureBuffer::new(2, OverflowPolicy::DropIncoming).unwrap();
/// assert_eq!(buffer.offer(1), Offer::Enqueued);
/// assert_eq!(buffer.offer(2), Offer::Enqueued);
/// assert_eq!(buffer.offer(3), Offer::Dropped);
///
/// assert_eq!(buffer.poll(), Some(1));
/// assert_eq!(buffer.dropped_count(), 1);
/// ```
pub struct BackpressureBuffer<T> {
    queue: Mutex<VecDeque<T>>,
    capacity: usize,
    policy: OverflowPolicy,
    dropped: AtomicU64,
}

impl<T> BackpressureBuffer<T> {
    /// Create a buffer holding at most `capacity` items (unless the policy is
    /// [`OverflowPolicy::Unbounded`]).
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::InvalidConfiguration`] if `capacity` is zero.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(RippleError::invalid_configuration(
                "backpressure buffer capacity must be at least 1",
            ));
        }

        Ok(Self::build(capacity, policy))
    }

    /// Create a buffer from an already validated configuration.
    pub fn with_config(config: &BackpressureConfig) -> Self {
        Self::build(config.capacity(), config.policy())
    }

    fn build(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_BUFFER_CAPACITY))),
            capacity,
            policy,
            dropped: AtomicU64::new(0),
        }
    }

    /// Append `item`, applying the overflow policy if the buffer is full.
    pub fn offer(&self, item: T) -> Offer {
        let mut queue = self.queue.lock();

        if queue.len() < self.capacity || self.policy == OverflowPolicy::Unbounded {
            queue.push_back(item);
            return Offer::Enqueued;
        }

        match self.policy {
            OverflowPolicy::DropIncoming => {
                drop(queue);
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!(
                    "backpressure buffer full (capacity {}): dropped incoming item",
                    self.capacity
                );
                Offer::Dropped
            }
            OverflowPolicy::KeepLatest => {
                let discarded = queue.len();
                queue.clear();
                queue.push_back(item);
                drop(queue);
                self.dropped.fetch_add(discarded as u64, Ordering::Relaxed);
                trace!(
                    "backpressure buffer full (capacity {}): replaced {} buffered items",
                    self.capacity,
                    discarded
                );
                Offer::Replaced(discarded)
            }
            OverflowPolicy::Fail => Offer::Overflowed,
            OverflowPolicy::Unbounded => unreachable!("unbounded buffers never overflow"),
        }
    }

    /// Remove the oldest item.
    pub fn poll(&self) -> Option<T> {
        self.queue.lock().pop_front()
    }

    /// Discard every buffered item and return how many there were.
    ///
    /// Cleared items are not counted as overflow loss.
    pub fn clear(&self) -> usize {
        let mut queue = self.queue.lock();
        let len = queue.len();
        queue.clear();
        len
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Configured capacity.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Configured overflow policy.
    pub const fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Total number of items discarded by the overflow policy so far.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T> fmt::Debug for BackpressureBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackpressureBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .field("dropped", &self.dropped_count())
            .finish()
    }
}
