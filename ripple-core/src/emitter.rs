// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Producer-side handle that serializes signals into a [`Sink`].

use crate::logging::{error, trace};
use crate::{CancellationToken, Demand, Notification, Sink, Subscription};
use parking_lot::Mutex;
use ripple_error::{Result, RippleError};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Signal<T> {
    Subscribe(Subscription),
    Notify(Notification<T>),
}

struct Shared<T> {
    queue: Mutex<VecDeque<Signal<T>>>,
    wip: AtomicUsize,
    sink: Mutex<Option<Box<dyn Sink<T>>>>,
    terminated: AtomicBool,
    token: CancellationToken,
    demand: Option<Arc<Demand>>,
    losses: Arc<AtomicU64>,
}

/// Handle a source uses to push signals to its subscriber.
///
/// Emitters are cheap to clone and may be used from any number of threads:
/// concurrent calls are queued and delivered to the sink one at a time, in
/// the order they were accepted, and no lock is held while the sink runs.
///
/// Once the subscription is cancelled, signals are dropped silently. A signal
/// emitted after `complete`/`error` is a protocol violation: it is logged and
/// reported as `Err`, and never reaches the sink.
pub struct Emitter<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> Emitter<T> {
    /// Wrap `sink`; delivery stops when `token` is cancelled.
    pub fn new<S>(sink: S, token: CancellationToken) -> Self
    where
        S: Sink<T>,
    {
        Self::from_parts(Box::new(sink), token, None, Arc::default())
    }

    /// Like [`new`](Self::new), exposing `demand` to the producer through
    /// [`requested`](Self::requested) and [`wait_for_demand`](Self::wait_for_demand).
    pub fn with_demand<S>(sink: S, token: CancellationToken, demand: Arc<Demand>) -> Self
    where
        S: Sink<T>,
    {
        Self::from_parts(Box::new(sink), token, Some(demand), Arc::default())
    }

    pub(crate) fn from_parts(
        sink: Box<dyn Sink<T>>,
        token: CancellationToken,
        demand: Option<Arc<Demand>>,
        losses: Arc<AtomicU64>,
    ) -> Self {
        if let Some(demand) = &demand {
            demand.wake_on_cancel(&token);
        }

        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::new()),
                wip: AtomicUsize::new(0),
                sink: Mutex::new(Some(sink)),
                terminated: AtomicBool::new(false),
                token,
                demand,
                losses,
            }),
        }
    }

    /// Build the emitter an operator stage hands to its upstream.
    ///
    /// `build` receives the upstream token, a child of this emitter's token:
    /// disposing downstream releases upstream, and the stage may cancel the
    /// upstream alone (for example after a failing callback). Demand
    /// visibility is inherited.
    pub fn upstream<U, S, F>(&self, build: F) -> Emitter<U>
    where
        U: Send + 'static,
        S: Sink<U>,
        F: FnOnce(CancellationToken) -> S,
    {
        let token = self.shared.token.child_token();
        let sink = build(token.clone());
        Emitter::from_parts(
            Box::new(sink),
            token,
            self.shared.demand.clone(),
            Arc::clone(&self.shared.losses),
        )
    }

    /// Emitter for one of several upstreams merged by a stage (inner streams,
    /// zip sides), stopped by `token`.
    ///
    /// Loss accounting is shared with this emitter; demand is not, since the
    /// stage decides itself how fast each branch may go.
    pub fn branch<U, S>(&self, sink: S, token: CancellationToken) -> Emitter<U>
    where
        U: Send + 'static,
        S: Sink<U>,
    {
        Emitter::from_parts(
            Box::new(sink),
            token,
            None,
            Arc::clone(&self.shared.losses),
        )
    }

    /// Deliver `on_subscribe` to the sink. Always the first signal.
    pub fn start(&self, subscription: Subscription) {
        self.shared
            .queue
            .lock()
            .push_back(Signal::Subscribe(subscription));
        self.drain();
    }

    /// Emit an item.
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::ProtocolViolation`] if a terminal signal was
    /// already emitted.
    pub fn next(&self, item: T) -> Result<()> {
        self.emit(Notification::Item(item))
    }

    /// Emit the completion signal.
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::ProtocolViolation`] if a terminal signal was
    /// already emitted.
    pub fn complete(&self) -> Result<()> {
        self.emit(Notification::Completed)
    }

    /// Emit a terminal error.
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::ProtocolViolation`] if a terminal signal was
    /// already emitted.
    pub fn error(&self, error: RippleError) -> Result<()> {
        self.emit(Notification::Failed(error))
    }

    /// Emit any notification.
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::ProtocolViolation`] if a terminal signal was
    /// already emitted.
    pub fn emit(&self, notification: Notification<T>) -> Result<()> {
        if !self.accept(&notification) {
            let kind = if notification.is_terminal() {
                "terminal signal"
            } else {
                "item"
            };
            error!("protocol violation: {} emitted after termination", kind);
            return Err(RippleError::protocol_violation(format!(
                "{kind} emitted after termination"
            )));
        }

        self.enqueue(notification);
        Ok(())
    }

    /// Emit a notification, silently dropping it if the stream already
    /// terminated.
    ///
    /// For stages that merge several concurrent producers (inner streams,
    /// timers) where losing the race against a terminal signal is expected.
    pub fn forward(&self, notification: Notification<T>) {
        if self.accept(&notification) {
            self.enqueue(notification);
        } else {
            trace!("signal after termination dropped");
        }
    }

    fn accept(&self, notification: &Notification<T>) -> bool {
        if notification.is_terminal() {
            !self.shared.terminated.swap(true, Ordering::AcqRel)
        } else {
            !self.shared.terminated.load(Ordering::Acquire)
        }
    }

    fn enqueue(&self, notification: Notification<T>) {
        if self.shared.token.is_cancelled() {
            return;
        }
        self.shared
            .queue
            .lock()
            .push_back(Signal::Notify(notification));
        self.drain();
    }

    fn drain(&self) {
        let shared = &*self.shared;
        if shared.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        let mut missed = 1;
        loop {
            let mut slot = shared.sink.lock().take();

            while let Some(sink) = slot.as_mut() {
                let Some(signal) = shared.queue.lock().pop_front() else {
                    break;
                };

                match signal {
                    Signal::Subscribe(subscription) => sink.on_subscribe(subscription),
                    Signal::Notify(_) if shared.token.is_cancelled() => {
                        slot = None;
                    }
                    Signal::Notify(notification) => {
                        let terminal = notification.is_terminal();
                        notification.deliver_to(&mut **sink);
                        if terminal {
                            slot = None;
                            shared.token.cancel();
                        }
                    }
                }
            }

            match slot {
                Some(sink) => *shared.sink.lock() = Some(sink),
                None => shared.queue.lock().clear(),
            }

            missed = shared.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }

    /// Returns `true` once the subscription was cancelled or a terminal
    /// signal was emitted. Producers should stop when this is `true`.
    pub fn is_cancelled(&self) -> bool {
        self.shared.token.is_cancelled() || self.is_terminated()
    }

    /// Returns `true` once a terminal signal was emitted through this emitter.
    pub fn is_terminated(&self) -> bool {
        self.shared.terminated.load(Ordering::Acquire)
    }

    /// Token of this subscription (or stage).
    pub fn token(&self) -> &CancellationToken {
        &self.shared.token
    }

    /// Items the producer may emit right now: outstanding demand minus what
    /// is already buffered for the consumer, or `u64::MAX` when the consumer
    /// did not opt in to pull mode.
    pub fn requested(&self) -> u64 {
        self.shared
            .demand
            .as_ref()
            .map_or(crate::demand::UNBOUNDED, |d| d.credit())
    }

    /// Run `resume` every time the consumer grants more credit, until this
    /// emitter's token is cancelled.
    ///
    /// Returns `false` without registering for push subscriptions, where
    /// credit never runs out.
    pub fn on_demand<F>(&self, resume: F) -> bool
    where
        F: Fn() + Send + Sync + 'static,
    {
        let Some(demand) = &self.shared.demand else {
            return false;
        };
        if demand.credit() == crate::demand::UNBOUNDED {
            return false;
        }

        let id = demand.on_credit(resume);
        let demand = Arc::downgrade(demand);
        self.shared.token.on_cancel(move || {
            if let Some(demand) = demand.upgrade() {
                demand.remove_listener(id);
            }
        });
        true
    }

    /// Count `n` items discarded on the way to the subscriber.
    ///
    /// Visible through [`Subscription::dropped_count`] of the subscription
    /// this emitter delivers to.
    pub fn record_loss(&self, n: u64) {
        self.shared.losses.fetch_add(n, Ordering::AcqRel);
    }

    /// Items discarded so far along this subscription.
    pub fn dropped_count(&self) -> u64 {
        self.shared.losses.load(Ordering::Acquire)
    }

    pub(crate) fn losses(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.shared.losses)
    }

    /// Block until the consumer authorized more items.
    ///
    /// Returns `false` if the subscription was cancelled or `timeout`
    /// elapsed first. Returns `true` immediately for push subscriptions.
    pub fn wait_for_demand(&self, timeout: Option<Duration>) -> bool {
        match &self.shared.demand {
            Some(demand) => demand.wait_for(&self.shared.token, timeout),
            None => !self.is_cancelled(),
        }
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("cancelled", &self.shared.token.is_cancelled())
            .field(
                "terminated",
                &self.shared.terminated.load(Ordering::Acquire),
            )
            .field("queued", &self.shared.queue.lock().len())
            .finish()
    }
}
