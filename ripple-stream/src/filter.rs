// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::stage::lift;
use ripple_core::callback::catch_callback;
use ripple_core::{CancellationToken, Emitter, Notification, Observable, Sink};
use ripple_error::RippleError;
use std::sync::Arc;

/// Extension trait providing the `filter` operator.
pub trait FilterExt<T>: Sized {
    /// Keep only the items for which `predicate` returns `true`.
    ///
    /// A panicking predicate fails the stream and cancels the upstream.
    ///
    /// ```
    /// use ripple_core::Observable;
    /// use ripple_stream::FilterExt;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    /// Observable::from_iterable(1..=6)
    ///     .filter(|x| x % 2 == 0)
    ///     .subscribe_fn(move |x| sink.lock().unwrap().push(x));
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![2, 4, 6]);
    /// ```
    fn filter<P>(self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static;
}

impl<T: Send + 'static> FilterExt<T> for Observable<T> {
    fn filter<P>(self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        lift(self, move |downstream, upstream| FilterSink {
            predicate: Arc::clone(&predicate),
            downstream,
            upstream,
            done: false,
        })
    }
}

struct FilterSink<P, T> {
    predicate: Arc<P>,
    downstream: Emitter<T>,
    upstream: CancellationToken,
    done: bool,
}

impl<T, P> Sink<T> for FilterSink<P, T>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn on_item(&mut self, item: T) {
        if self.done {
            return;
        }
        match catch_callback(|| (self.predicate)(&item)) {
            Ok(true) => self.downstream.forward(Notification::Item(item)),
            Ok(false) => {}
            Err(e) => {
                self.done = true;
                self.upstream.cancel();
                self.downstream.forward(Notification::Failed(e));
            }
        }
    }

    fn on_complete(&mut self) {
        self.downstream.forward(Notification::Completed);
    }

    fn on_error(&mut self, error: RippleError) {
        self.downstream.forward(Notification::Failed(error));
    }
}
