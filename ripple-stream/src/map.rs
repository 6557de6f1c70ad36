// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! One-to-one transformation operators.

use crate::stage::lift;
use ripple_core::callback::catch_callback;
use ripple_core::{CancellationToken, Emitter, Notification, Observable, Sink};
use ripple_error::RippleError;
use std::sync::Arc;

/// Extension trait providing `map` and `try_map`.
pub trait MapExt<T>: Sized {
    /// Transform every item with `f`.
    ///
    /// # Behavior
    ///
    /// - Exactly one output item per input item, in input order
    /// - Completion and errors pass through unchanged
    /// - A panic in `f` becomes a [`RippleError::CallbackPanic`] delivered
    ///   through `on_error`, and the upstream is cancelled
    ///
    /// # Examples
    ///
    /// ```
    /// use ripple_core::Observable;
    /// use ripple_stream::MapExt;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    /// Observable::just(vec![1, 2, 3])
    ///     .map(|x| x * 10)
    ///     .subscribe_fn(move |x| sink.lock().unwrap().push(x));
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30]);
    /// ```
    ///
    /// # See Also
    ///
    /// - [`FilterExt::filter`](crate::FilterExt::filter) - Drop items
    /// - [`FlatMapExt::flat_map`](crate::FlatMapExt::flat_map) - One-to-many
    fn map<U, F>(self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static;

    /// Transform every item with a fallible `f`.
    ///
    /// The first `Err` ends the stream: it is delivered through `on_error`
    /// and the upstream is cancelled.
    ///
    /// ```
    /// use ripple_core::{Observable, RippleError};
    /// use ripple_stream::MapExt;
    ///
    /// let parsed = Observable::just(vec!["1", "2", "x"]).try_map(|s| {
    ///     s.parse::<i32>()
    ///         .map_err(|e| RippleError::stream_error(e.to_string()))
    /// });
    /// # let _ = parsed;
    /// ```
    fn try_map<U, E, F>(self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        E: Into<RippleError>,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static;
}

impl<T: Send + 'static> MapExt<T> for Observable<T> {
    fn map<U, F>(self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.try_map(move |item| Ok::<_, RippleError>(f(item)))
    }

    fn try_map<U, E, F>(self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        E: Into<RippleError>,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        lift(self, move |downstream, upstream| MapSink {
            f: Arc::clone(&f),
            downstream,
            upstream,
            done: false,
        })
    }
}

struct MapSink<F, U> {
    f: Arc<F>,
    downstream: Emitter<U>,
    upstream: CancellationToken,
    done: bool,
}

impl<F, U: Send + 'static> MapSink<F, U> {
    fn fail(&mut self, error: RippleError) {
        self.done = true;
        self.upstream.cancel();
        self.downstream.forward(Notification::Failed(error));
    }
}

impl<T, U, E, F> Sink<T> for MapSink<F, U>
where
    T: Send + 'static,
    U: Send + 'static,
    E: Into<RippleError>,
    F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
{
    fn on_item(&mut self, item: T) {
        if self.done {
            return;
        }
        match catch_callback(|| (self.f)(item)) {
            Ok(Ok(mapped)) => self.downstream.forward(Notification::Item(mapped)),
            Ok(Err(e)) => self.fail(e.into()),
            Err(panic) => self.fail(panic),
        }
    }

    fn on_complete(&mut self) {
        self.downstream.forward(Notification::Completed);
    }

    fn on_error(&mut self, error: RippleError) {
        self.downstream.forward(Notification::Failed(error));
    }
}
