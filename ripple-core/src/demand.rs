// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Demand counter for pull-mode subscriptions.

use crate::CancellationToken;
use event_listener::{Event, Listener};
use parking_lot::Mutex;
use ripple_error::{Result, RippleError};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// Demand value meaning "no limit". It is never decremented.
pub const UNBOUNDED: u64 = u64::MAX;

type CreditListener = Arc<dyn Fn() + Send + Sync>;

/// Number of items a consumer has authorized but not yet received.
///
/// `request(n)` adds to the counter (saturating at [`UNBOUNDED`]) and wakes
/// producers blocked in [`wait_for`](Demand::wait_for); each delivered item
/// consumes one unit.
///
/// Producers pace themselves on [`credit`](Demand::credit): the outstanding
/// demand, capped by the buffer window, minus the items already buffered and
/// waiting for delivery.
///
/// ```
/// use ripple_core::Demand;
///
/// let demand = Demand::new();
/// assert!(!demand.try_consume());
///
/// demand.request(2).unwrap();
/// assert!(demand.try_consume());
/// assert!(demand.try_consume());
/// assert!(!demand.try_consume());
/// ```
pub struct Demand {
    outstanding: AtomicU64,
    buffered: AtomicU64,
    window: u64,
    event: Event,
    listeners: Mutex<Listeners>,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, CreditListener)>,
}

impl Demand {
    /// Create a counter with no outstanding demand.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(UNBOUNDED)
    }

    /// Create a counter whose credit never exceeds `window` buffered items.
    #[must_use]
    pub fn with_window(window: u64) -> Self {
        Self::from_parts(0, window)
    }

    /// Create a counter that never runs out (unbounded push).
    #[must_use]
    pub fn unbounded() -> Self {
        Self::from_parts(UNBOUNDED, UNBOUNDED)
    }

    fn from_parts(outstanding: u64, window: u64) -> Self {
        Self {
            outstanding: AtomicU64::new(outstanding),
            buffered: AtomicU64::new(0),
            window,
            event: Event::new(),
            listeners: Mutex::new(Listeners::default()),
        }
    }

    /// Authorize `n` more items and return the new outstanding demand.
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::ProtocolViolation`] if `n` is zero.
    pub fn request(&self, n: u64) -> Result<u64> {
        if n == 0 {
            return Err(RippleError::protocol_violation(
                "request(0): demand must be positive",
            ));
        }

        let mut current = self.outstanding.load(Ordering::Acquire);
        let updated = loop {
            if current == UNBOUNDED {
                break UNBOUNDED;
            }
            let next = current.saturating_add(n);
            match self.outstanding.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break next,
                Err(actual) => current = actual,
            }
        };

        self.notify();
        Ok(updated)
    }

    /// Consume one unit of demand, returning `false` if none is outstanding.
    pub fn try_consume(&self) -> bool {
        let mut current = self.outstanding.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return false;
            }
            if current == UNBOUNDED {
                return true;
            }
            match self.outstanding.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Currently outstanding demand.
    pub fn outstanding(&self) -> u64 {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Returns `true` if this counter never runs out.
    pub fn is_unbounded(&self) -> bool {
        self.outstanding() == UNBOUNDED
    }

    /// Items a producer may still emit without overrunning the consumer.
    ///
    /// [`UNBOUNDED`] for push counters.
    pub fn credit(&self) -> u64 {
        let outstanding = self.outstanding();
        if outstanding == UNBOUNDED && self.window == UNBOUNDED {
            return UNBOUNDED;
        }
        outstanding
            .min(self.window)
            .saturating_sub(self.buffered.load(Ordering::Acquire))
    }

    /// An item entered the buffer in front of the consumer.
    pub fn mark_buffered(&self) {
        self.buffered.fetch_add(1, Ordering::AcqRel);
    }

    /// `n` buffered items left the buffer, delivered or discarded; frees
    /// window credit.
    pub fn mark_released(&self, n: u64) {
        let _ = self
            .buffered
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |b| {
                Some(b.saturating_sub(n))
            });
        if self.window != UNBOUNDED {
            self.notify();
        }
    }

    /// Call `listener` whenever credit may have grown. Returns an id for
    /// [`remove_listener`](Self::remove_listener).
    ///
    /// Listeners run on the thread that requested or delivered, with no lock
    /// held.
    pub fn on_credit<F>(&self, listener: F) -> u64
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: u64) {
        self.listeners
            .lock()
            .entries
            .retain(|(entry, _)| *entry != id);
    }

    fn notify(&self) {
        self.event.notify(usize::MAX);

        let listeners: Vec<CreditListener> = {
            let listeners = self.listeners.lock();
            if listeners.entries.is_empty() {
                return;
            }
            listeners
                .entries
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };
        for listener in listeners {
            listener();
        }
    }

    /// Block until [`credit`](Self::credit) is available, `token` is cancelled
    /// or `timeout` elapses.
    ///
    /// Returns `true` if credit is available. Producers call this to throttle
    /// themselves instead of overflowing the buffer. Cancellation only wakes the
    /// waiter if the counter was linked with [`wake_on_cancel`](Self::wake_on_cancel).
    pub fn wait_for(&self, token: &CancellationToken, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if self.credit() > 0 {
                return true;
            }
            if token.is_cancelled() {
                return false;
            }

            let listener = self.event.listen();
            if self.credit() > 0 {
                return true;
            }
            if token.is_cancelled() {
                return false;
            }

            match deadline {
                Some(deadline) => {
                    if listener.wait_deadline(deadline).is_none() {
                        return self.credit() > 0;
                    }
                }
                None => listener.wait(),
            }
        }
    }

    /// Wake producers blocked in [`wait_for`](Self::wait_for) once `token` is cancelled.
    pub fn wake_on_cancel(self: &Arc<Self>, token: &CancellationToken) {
        let demand: Weak<Self> = Arc::downgrade(self);
        token.on_cancel(move || {
            if let Some(demand) = demand.upgrade() {
                demand.event.notify(usize::MAX);
            }
        });
    }
}

impl Default for Demand {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Demand")
            .field("outstanding", &self.outstanding())
            .field("buffered", &self.buffered.load(Ordering::Acquire))
            .field("window", &self.window)
            .finish()
    }
}
