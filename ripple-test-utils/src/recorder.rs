// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A sink that records what it receives.

use parking_lot::{Condvar, Mutex};
use ripple_core::{Notification, Sink, Subscription};
use ripple_error::RippleError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

struct State<T> {
    events: Vec<Notification<T>>,
    threads: Vec<ThreadId>,
    subscription: Option<Subscription>,
    subscribe_calls: usize,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    changed: Condvar,
    in_call: AtomicBool,
    overlapping_calls: AtomicUsize,
    late_signals: AtomicUsize,
}

/// Shared view of everything delivered to the [`RecordingSink`]s it creates.
pub struct Recorder<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    events: Vec::new(),
                    threads: Vec::new(),
                    subscription: None,
                    subscribe_calls: 0,
                }),
                changed: Condvar::new(),
                in_call: AtomicBool::new(false),
                overlapping_calls: AtomicUsize::new(0),
                late_signals: AtomicUsize::new(0),
            }),
        }
    }

    /// A sink that only records.
    pub fn sink(&self) -> RecordingSink<T> {
        RecordingSink {
            recorder: self.clone(),
            dispose_after: None,
            request_on_subscribe: None,
            request_per_item: None,
            processing_delay: None,
            seen: 0,
        }
    }

    /// Items received so far.
    pub fn items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.shared
            .state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                Notification::Item(item) => Some(item.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.shared
            .state
            .lock()
            .events
            .iter()
            .filter(|event| event.is_item())
            .count()
    }

    pub fn is_completed(&self) -> bool {
        self.shared
            .state
            .lock()
            .events
            .iter()
            .any(|event| matches!(event, Notification::Completed))
    }

    /// The terminal error, if one was received.
    pub fn error(&self) -> Option<RippleError> {
        self.shared
            .state
            .lock()
            .events
            .iter()
            .find_map(|event| match event {
                Notification::Failed(e) => Some(e.clone()),
                _ => None,
            })
    }

    /// Apply `f` to the terminal error in place.
    ///
    /// Unlike [`error`](Self::error), this sees the original variant: cloning a
    /// `UserError` flattens it into a `StreamProcessingError`.
    pub fn inspect_error<R>(&self, f: impl FnOnce(&RippleError) -> R) -> Option<R> {
        let state = self.shared.state.lock();
        let error = state.events.iter().find_map(|event| match event {
            Notification::Failed(e) => Some(e),
            _ => None,
        });
        error.map(f)
    }

    pub fn is_terminated(&self) -> bool {
        self.terminal_count() > 0
    }

    /// Number of terminal signals received; more than one is a protocol bug.
    pub fn terminal_count(&self) -> usize {
        self.shared
            .state
            .lock()
            .events
            .iter()
            .filter(|event| event.is_terminal())
            .count()
    }

    /// Handle received through `on_subscribe`.
    pub fn subscription(&self) -> Option<Subscription> {
        self.shared.state.lock().subscription.clone()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.shared.state.lock().subscribe_calls
    }

    /// Threads that delivered signals, in delivery order.
    pub fn delivery_threads(&self) -> Vec<ThreadId> {
        self.shared.state.lock().threads.clone()
    }

    /// Calls that started while another call was still running.
    pub fn overlapping_calls(&self) -> usize {
        self.shared.overlapping_calls.load(Ordering::SeqCst)
    }

    /// Signals that arrived after a terminal signal.
    pub fn late_signals(&self) -> usize {
        self.shared.late_signals.load(Ordering::SeqCst)
    }

    /// Block until at least `n` items arrived. Returns `false` on timeout.
    pub fn wait_for_items(&self, n: usize, timeout: Duration) -> bool {
        self.wait_while(timeout, |state| {
            state.events.iter().filter(|e| e.is_item()).count() < n
        })
    }

    /// Block until a terminal signal arrived. Returns `false` on timeout.
    pub fn wait_for_terminal(&self, timeout: Duration) -> bool {
        self.wait_while(timeout, |state| {
            !state.events.iter().any(Notification::is_terminal)
        })
    }

    /// Total number of signals (items and terminals) received.
    pub fn event_count(&self) -> usize {
        self.shared.state.lock().events.len()
    }

    fn wait_while(&self, timeout: Duration, pending: impl Fn(&State<T>) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while pending(&state) {
            if self
                .shared
                .changed
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return !pending(&state);
            }
        }
        true
    }

    fn enter(&self) {
        if self.shared.in_call.swap(true, Ordering::SeqCst) {
            self.shared.overlapping_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn leave(&self) {
        self.shared.in_call.store(false, Ordering::SeqCst);
    }

    fn record(&self, event: Notification<T>) {
        let mut state = self.shared.state.lock();
        if state.events.iter().any(Notification::is_terminal) {
            self.shared.late_signals.fetch_add(1, Ordering::SeqCst);
        }
        state.events.push(event);
        state.threads.push(thread::current().id());
        drop(state);
        self.shared.changed.notify_all();
    }
}

/// Sink half of a [`Recorder`], optionally acting as a scripted consumer.
pub struct RecordingSink<T> {
    recorder: Recorder<T>,
    dispose_after: Option<usize>,
    request_on_subscribe: Option<u64>,
    request_per_item: Option<u64>,
    processing_delay: Option<Duration>,
    seen: usize,
}

impl<T> RecordingSink<T> {
    /// Dispose the subscription from inside `on_item` once `n` items arrived.
    #[must_use]
    pub fn dispose_after(mut self, n: usize) -> Self {
        self.dispose_after = Some(n);
        self
    }

    /// Call `request(n)` from `on_subscribe`.
    #[must_use]
    pub fn request_on_subscribe(mut self, n: u64) -> Self {
        self.request_on_subscribe = Some(n);
        self
    }

    /// Call `request(n)` after every item.
    #[must_use]
    pub fn request_per_item(mut self, n: u64) -> Self {
        self.request_per_item = Some(n);
        self
    }

    /// Sleep this long in every `on_item`, simulating a slow consumer.
    #[must_use]
    pub fn processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = Some(delay);
        self
    }
}

impl<T: Send + 'static> Sink<T> for RecordingSink<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        {
            let mut state = self.recorder.shared.state.lock();
            state.subscribe_calls += 1;
            state.subscription = Some(subscription.clone());
        }
        self.recorder.shared.changed.notify_all();

        if let Some(n) = self.request_on_subscribe {
            let _ = subscription.request(n);
        }
    }

    fn on_item(&mut self, item: T) {
        self.recorder.enter();
        if let Some(delay) = self.processing_delay {
            thread::sleep(delay);
        }
        self.recorder.record(Notification::Item(item));
        self.seen += 1;
        self.recorder.leave();

        let subscription = self.recorder.subscription();
        if let Some(subscription) = subscription {
            if self.dispose_after == Some(self.seen) {
                subscription.dispose();
            } else if let Some(n) = self.request_per_item {
                let _ = subscription.request(n);
            }
        }
    }

    fn on_complete(&mut self) {
        self.recorder.enter();
        self.recorder.record(Notification::Completed);
        self.recorder.leave();
    }

    fn on_error(&mut self, error: RippleError) {
        self.recorder.enter();
        self.recorder.record(Notification::Failed(error));
        self.recorder.leave();
    }
}
