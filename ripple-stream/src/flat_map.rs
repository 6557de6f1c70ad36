// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Operators mapping every item to an inner [`Observable`] and merging the
//! inner streams into one.
//!
//! | operator | inner streams active at once | output order |
//! |----------|------------------------------|--------------|
//! | [`flat_map`](FlatMapExt::flat_map) | unbounded | interleaved |
//! | [`flat_map_with_concurrency`](FlatMapExt::flat_map_with_concurrency) | at most `n` | interleaved |
//! | [`concat_map`](FlatMapExt::concat_map) | one | upstream order, then inner order |
//!
//! Inner streams that cannot start yet are queued in upstream order. The
//! merged stream completes once the upstream and every inner stream
//! completed; the first error from any of them cancels all the others.

use crate::logging::{debug, trace};
use parking_lot::Mutex;
use ripple_core::callback::catch_callback;
use ripple_core::{CancellationToken, Emitter, Notification, Observable, Sink};
use ripple_error::RippleError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Extension trait providing `flat_map`, `flat_map_with_concurrency` and
/// `concat_map`.
pub trait FlatMapExt<T>: Sized {
    /// Map each item to an inner observable and merge all inner streams as
    /// they run concurrently.
    ///
    /// Items from different inner streams may interleave; within one inner
    /// stream order is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use ripple_core::Observable;
    /// use ripple_stream::FlatMapExt;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    /// Observable::just(vec![1, 2])
    ///     .flat_map(|x| Observable::just(vec![x, x * 10]))
    ///     .subscribe_fn(move |x| sink.lock().unwrap().push(x));
    ///
    /// let mut seen = seen.lock().unwrap().clone();
    /// seen.sort_unstable();
    /// assert_eq!(seen, vec![1, 2, 10, 20]);
    /// ```
    ///
    /// # See Also
    ///
    /// - [`concat_map`](FlatMapExt::concat_map) - Ordered variant
    /// - [`MapExt::map`](crate::MapExt::map) - One-to-one
    fn flat_map<U, F>(self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Observable<U> + Send + Sync + 'static;

    /// Like [`flat_map`](FlatMapExt::flat_map), running at most
    /// `max_concurrency` inner streams at a time.
    ///
    /// `max_concurrency == 0` fails every subscription with
    /// [`RippleError::InvalidConfiguration`].
    fn flat_map_with_concurrency<U, F>(self, max_concurrency: usize, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Observable<U> + Send + Sync + 'static;

    /// Map each item to an inner observable and run the inner streams one
    /// after another, in upstream order.
    ///
    /// ```
    /// use ripple_core::Observable;
    /// use ripple_stream::FlatMapExt;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    /// Observable::just(vec!["a", "b"])
    ///     .concat_map(|s| Observable::just(vec![format!("{s}1"), format!("{s}2")]))
    ///     .subscribe_fn(move |x| sink.lock().unwrap().push(x));
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec!["a1", "a2", "b1", "b2"]);
    /// ```
    fn concat_map<U, F>(self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Observable<U> + Send + Sync + 'static;
}

impl<T: Send + 'static> FlatMapExt<T> for Observable<T> {
    fn flat_map<U, F>(self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Observable<U> + Send + Sync + 'static,
    {
        self.flat_map_with_concurrency(usize::MAX, f)
    }

    fn flat_map_with_concurrency<U, F>(self, max_concurrency: usize, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Observable<U> + Send + Sync + 'static,
    {
        if max_concurrency == 0 {
            return Observable::fail(RippleError::invalid_configuration(
                "flat_map concurrency must be at least 1",
            ));
        }

        let f = Arc::new(f);
        Observable::from_source(move |downstream: Emitter<U>| {
            let merge = Merge::new(Arc::clone(&f), max_concurrency, downstream);
            let upstream = merge
                .downstream
                .branch(OuterSink(Arc::clone(&merge)), merge.upstream.clone());
            self.activate(upstream);
        })
    }

    fn concat_map<U, F>(self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Observable<U> + Send + Sync + 'static,
    {
        self.flat_map_with_concurrency(1, f)
    }
}

struct Pending<T> {
    items: VecDeque<T>,
    running: usize,
}

struct Merge<T, U, F> {
    f: Arc<F>,
    max_concurrency: usize,
    downstream: Emitter<U>,
    upstream: CancellationToken,
    inners: CancellationToken,
    /// The upstream plus every queued or running inner stream.
    active: AtomicUsize,
    pending: Mutex<Pending<T>>,
    wip: AtomicUsize,
    done: AtomicBool,
}

impl<T, U, F> Merge<T, U, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Observable<U> + Send + Sync + 'static,
{
    fn new(f: Arc<F>, max_concurrency: usize, downstream: Emitter<U>) -> Arc<Self> {
        let upstream = downstream.token().child_token();
        let inners = downstream.token().child_token();
        Arc::new(Self {
            f,
            max_concurrency,
            downstream,
            upstream,
            inners,
            active: AtomicUsize::new(1),
            pending: Mutex::new(Pending {
                items: VecDeque::new(),
                running: 0,
            }),
            wip: AtomicUsize::new(0),
            done: AtomicBool::new(false),
        })
    }

    fn on_outer_item(self: &Arc<Self>, item: T) {
        if self.done.load(Ordering::Acquire) {
            return;
        }
        self.active.fetch_add(1, Ordering::AcqRel);
        self.pending.lock().items.push_back(item);
        self.drain_pending();
    }

    fn on_inner_complete(self: &Arc<Self>) {
        self.pending.lock().running -= 1;
        self.drain_pending();
        self.finish_one();
    }

    /// Start queued inner streams while below the concurrency limit.
    ///
    /// Serialized: an inner stream completing synchronously inside
    /// `activate` re-enters here and is picked up by the running loop.
    fn drain_pending(self: &Arc<Self>) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        let mut missed = 1;
        loop {
            loop {
                let next = {
                    let mut pending = self.pending.lock();
                    if pending.running < self.max_concurrency {
                        let item = pending.items.pop_front();
                        if item.is_some() {
                            pending.running += 1;
                        }
                        item
                    } else {
                        None
                    }
                };
                match next {
                    Some(item) => self.subscribe_inner(item),
                    None => break,
                }
            }

            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn subscribe_inner(self: &Arc<Self>, item: T) {
        if self.done.load(Ordering::Acquire) {
            return;
        }
        match catch_callback(|| (self.f)(item)) {
            Ok(inner) => {
                trace!("subscribing inner stream");
                let emitter = self
                    .downstream
                    .branch(InnerSink(Arc::clone(self)), self.inners.child_token());
                inner.activate(emitter);
            }
            Err(e) => self.fail(e),
        }
    }

    fn finish_one(&self) {
        if self.active.fetch_sub(1, Ordering::AcqRel) == 1
            && !self.done.swap(true, Ordering::AcqRel)
        {
            self.downstream.forward(Notification::Completed);
        }
    }

    fn fail(&self, error: RippleError) {
        if self.done.swap(true, Ordering::AcqRel) {
            debug!("flat_map error after termination dropped: {}", error);
            return;
        }
        self.upstream.cancel();
        self.inners.cancel();
        self.downstream.forward(Notification::Failed(error));
    }
}

struct OuterSink<T, U, F>(Arc<Merge<T, U, F>>);

impl<T, U, F> Sink<T> for OuterSink<T, U, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Observable<U> + Send + Sync + 'static,
{
    fn on_item(&mut self, item: T) {
        self.0.on_outer_item(item);
    }

    fn on_complete(&mut self) {
        self.0.finish_one();
    }

    fn on_error(&mut self, error: RippleError) {
        self.0.fail(error);
    }
}

struct InnerSink<T, U, F>(Arc<Merge<T, U, F>>);

impl<T, U, F> Sink<U> for InnerSink<T, U, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Observable<U> + Send + Sync + 'static,
{
    fn on_item(&mut self, item: U) {
        self.0.downstream.forward(Notification::Item(item));
    }

    fn on_complete(&mut self) {
        self.0.on_inner_complete();
    }

    fn on_error(&mut self, error: RippleError) {
        self.0.fail(error);
    }
}
