// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::logging::trace;
use crate::stage::lift;
use ripple_core::{CancellationToken, Emitter, Notification, Observable, Sink};
use ripple_error::RippleError;

/// Extension trait providing the `take` operator.
pub trait TakeExt<T>: Sized {
    /// Emit the first `n` items, then complete and cancel the upstream.
    ///
    /// `take(0)` completes without subscribing upstream at all. Useful to
    /// bound endless sources:
    ///
    /// ```
    /// use ripple_core::Observable;
    /// use ripple_stream::TakeExt;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let naturals = Observable::create(|emitter| {
    ///     let mut i = 0u64;
    ///     while !emitter.is_cancelled() {
    ///         emitter.next(i)?;
    ///         i += 1;
    ///     }
    ///     Ok(())
    /// });
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    /// naturals.take(3).subscribe_fn(move |x| sink.lock().unwrap().push(x));
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    /// ```
    fn take(self, n: usize) -> Observable<T>;
}

impl<T: Send + 'static> TakeExt<T> for Observable<T> {
    fn take(self, n: usize) -> Observable<T> {
        if n == 0 {
            return Observable::empty();
        }
        lift(self, move |downstream, upstream| TakeSink {
            remaining: n,
            downstream,
            upstream,
        })
    }
}

struct TakeSink<T> {
    remaining: usize,
    downstream: Emitter<T>,
    upstream: CancellationToken,
}

impl<T: Send + 'static> Sink<T> for TakeSink<T> {
    fn on_item(&mut self, item: T) {
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        self.downstream.forward(Notification::Item(item));

        if self.remaining == 0 {
            trace!("take limit reached, releasing upstream");
            self.upstream.cancel();
            self.downstream.forward(Notification::Completed);
        }
    }

    fn on_complete(&mut self) {
        self.downstream.forward(Notification::Completed);
    }

    fn on_error(&mut self, error: RippleError) {
        self.downstream.forward(Notification::Failed(error));
    }
}
