// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cold, subscribable sources.

use crate::callback::try_callback;
use crate::demand::UNBOUNDED;
use crate::logging::error;
use crate::options::SubscribeOptions;
use crate::{
    BackpressureConfig, BufferedDelivery, CancellationToken, Demand, Emitter, FnSink,
    Notification, OverflowPolicy, Sink, Subscription,
};
use parking_lot::Mutex;
use ripple_error::{Result, RippleError};
use std::fmt;
use std::iter::Peekable;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Producer behind an [`Observable`].
///
/// `activate` runs once per subscription and may emit synchronously or hand
/// the emitter to other threads. Producers stop when
/// [`Emitter::is_cancelled`] turns `true`.
pub trait Source<T>: Send + Sync + 'static {
    fn activate(&self, emitter: Emitter<T>);
}

impl<T, F> Source<T> for F
where
    F: Fn(Emitter<T>) + Send + Sync + 'static,
{
    fn activate(&self, emitter: Emitter<T>) {
        self(emitter);
    }
}

/// A cold stream of `T`: every subscription runs the source anew.
///
/// ```
/// use ripple_core::Observable;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// Observable::from_iterable(1..=3).subscribe_fn(move |x| sink.lock().unwrap().push(x));
///
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
/// ```
pub struct Observable<T> {
    source: Arc<dyn Source<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Wrap a [`Source`].
    pub fn from_source<S>(source: S) -> Self
    where
        S: Source<T>,
    {
        Self {
            source: Arc::new(source),
        }
    }

    /// Create an observable from a producer function.
    ///
    /// The producer runs on the subscribing thread (unless `subscribe_on` is
    /// used) and may spawn work that keeps emitting through a clone of the
    /// emitter. If it returns `Err` or panics before emitting a terminal
    /// signal, the subscriber receives the error.
    ///
    /// ```
    /// use ripple_core::Observable;
    ///
    /// let numbers = Observable::create(|emitter| {
    ///     for i in 0..3 {
    ///         emitter.next(i)?;
    ///     }
    ///     emitter.complete()
    /// });
    /// # let _ = numbers;
    /// ```
    pub fn create<F>(producer: F) -> Self
    where
        F: Fn(&Emitter<T>) -> Result<()> + Send + Sync + 'static,
    {
        Self::from_source(move |emitter: Emitter<T>| {
            if let Err(e) = try_callback(|| producer(&emitter)) {
                if emitter.is_terminated() {
                    if !e.is_protocol_violation() {
                        error!("producer failed after its stream terminated: {}", e);
                    }
                } else {
                    emitter.forward(Notification::Failed(e));
                }
            }
        })
    }

    /// Emit clones of `items` and complete.
    ///
    /// Under a pull-mode subscription items are emitted only as the consumer
    /// requests them.
    pub fn just<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        let items: Arc<[T]> = items.into_iter().collect();
        Self::from_source(move |emitter: Emitter<T>| {
            let items = Arc::clone(&items);
            emit_all(emitter, (0..items.len()).map(move |i| items[i].clone()));
        })
    }

    /// Iterate a fresh clone of `iterable` per subscription and complete.
    ///
    /// Under a pull-mode subscription the iterator is advanced only as the
    /// consumer requests items.
    pub fn from_iterable<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
        I::IntoIter: Send + 'static,
    {
        Self::from_source(move |emitter: Emitter<T>| {
            emit_all(emitter, iterable.clone().into_iter());
        })
    }

    /// Complete immediately.
    pub fn empty() -> Self {
        Self::from_source(|emitter: Emitter<T>| {
            emitter.forward(Notification::Completed);
        })
    }

    /// Fail immediately with `error`.
    pub fn fail(error: RippleError) -> Self {
        Self::from_source(move |emitter: Emitter<T>| {
            emitter.forward(Notification::Failed(error.clone()));
        })
    }

    /// Never emit anything.
    pub fn never() -> Self {
        Self::from_source(|_emitter: Emitter<T>| {})
    }

    /// Run the source against `emitter`. Operators call this to subscribe to
    /// their upstream.
    pub fn activate(&self, emitter: Emitter<T>) {
        self.source.activate(emitter);
    }

    /// Subscribe with unbounded push delivery on the emitting thread.
    pub fn subscribe<S>(&self, sink: S) -> Subscription
    where
        S: Sink<T>,
    {
        self.subscribe_with(sink, SubscribeOptions::default())
    }

    /// Subscribe with an item callback only. Errors are logged.
    pub fn subscribe_fn<F>(&self, on_item: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static,
    {
        self.subscribe(FnSink::new(on_item))
    }

    /// Subscribe with explicit delivery options.
    ///
    /// `sink.on_subscribe` is called before this returns, and before any item.
    pub fn subscribe_with<S>(&self, sink: S, options: SubscribeOptions) -> Subscription
    where
        S: Sink<T>,
    {
        let token = CancellationToken::new();
        let downstream = Emitter::new(sink, token.clone());

        let (backpressure, delivery) = options.into_parts();
        if backpressure.is_none() && delivery.is_none() {
            let subscription = Subscription::new(token).with_losses(downstream.losses());
            downstream.start(subscription.clone());
            self.activate(downstream);
            return subscription;
        }

        let worker = delivery.map(|scheduler| scheduler.create_worker());
        let (config, demand, pull) = match backpressure {
            Some(config) => {
                let window = match config.policy() {
                    OverflowPolicy::Unbounded => UNBOUNDED,
                    _ => config.capacity() as u64,
                };
                (config, Demand::with_window(window), true)
            }
            None => (BackpressureConfig::unbounded(), Demand::unbounded(), false),
        };

        let stage = BufferedDelivery::new(&config, Arc::new(demand), worker, downstream.clone());
        let subscription = if pull {
            Subscription::pull(token, stage.clone())
        } else {
            Subscription::buffered(token, stage.clone())
        }
        .with_losses(downstream.losses());

        downstream.start(subscription.clone());
        self.activate(stage.upstream_emitter());
        subscription
    }
}

fn emit_all<T, I>(emitter: Emitter<T>, items: I)
where
    T: Send + 'static,
    I: Iterator<Item = T> + Send + 'static,
{
    if emitter.requested() == UNBOUNDED {
        for item in items {
            if emitter.is_cancelled() || emitter.next(item).is_err() {
                return;
            }
        }
        emitter.forward(Notification::Completed);
        return;
    }

    let paced = Arc::new(Paced {
        emitter,
        items: Mutex::new(Some(items.peekable())),
        wip: AtomicUsize::new(0),
    });
    let resume = Arc::clone(&paced);
    paced.emitter.on_demand(move || resume.resume());
    paced.resume();
}

/// Iterator source under pull mode: emits while the consumer has credit and
/// picks up again from `request(n)`.
struct Paced<T, I: Iterator<Item = T>> {
    emitter: Emitter<T>,
    items: Mutex<Option<Peekable<I>>>,
    wip: AtomicUsize,
}

impl<T, I> Paced<T, I>
where
    T: Send + 'static,
    I: Iterator<Item = T>,
{
    fn resume(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        let mut missed = 1;
        loop {
            self.emit_available();
            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }

    // Only the `wip` owner gets here, so the lock is never contended; it is
    // held while the sink runs and any reentrant `resume` returns early.
    fn emit_available(&self) {
        let mut slot = self.items.lock();
        loop {
            let Some(items) = slot.as_mut() else {
                return;
            };
            if self.emitter.is_cancelled() {
                *slot = None;
                return;
            }
            if items.peek().is_none() {
                *slot = None;
                self.emitter.forward(Notification::Completed);
                return;
            }
            if self.emitter.requested() == 0 {
                return;
            }
            let Some(item) = items.next() else {
                continue;
            };
            if self.emitter.next(item).is_err() {
                *slot = None;
                return;
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> FromIterator<T> for Observable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::just(iter)
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}
