// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Blocking consumption of observables.

use crate::logging::warn;
use crate::IntoStreamExt;
use futures::executor::block_on_stream;
use parking_lot::{Condvar, Mutex};
use ripple_core::{Observable, Sink};
use ripple_error::{Result, RippleError};
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Extension trait providing blocking consumers.
///
/// Each call subscribes anew and blocks the calling thread until the
/// observable terminates. Avoid calling these from a scheduler worker that
/// the observable itself needs.
pub trait BlockingExt<T>: Sized {
    /// Collect every item until completion.
    ///
    /// ```
    /// use ripple_core::Observable;
    /// use ripple_exec::BlockingExt;
    ///
    /// let items = Observable::from_iterable(1..=4).blocking_collect().unwrap();
    /// assert_eq!(items, vec![1, 2, 3, 4]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the error that terminated the observable; items received
    /// before it are discarded.
    fn blocking_collect(&self) -> Result<Vec<T>>;

    /// Like [`blocking_collect`](BlockingExt::blocking_collect), giving up
    /// after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::Timeout`] if the observable did not terminate
    /// in time; the subscription is disposed first.
    fn blocking_collect_timeout(&self, timeout: Duration) -> Result<Vec<T>>;

    /// Run `f` for every item on the calling thread, until completion.
    ///
    /// # Errors
    ///
    /// Returns the error that terminated the observable.
    fn blocking_for_each<F>(&self, f: F) -> Result<()>
    where
        F: FnMut(T);
}

impl<T: Send + 'static> BlockingExt<T> for Observable<T> {
    fn blocking_collect(&self) -> Result<Vec<T>> {
        collect(self, None)
    }

    fn blocking_collect_timeout(&self, timeout: Duration) -> Result<Vec<T>> {
        collect(self, Some(timeout))
    }

    fn blocking_for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(T),
    {
        for item in block_on_stream(self.clone().into_stream()) {
            f(item.into_result()?);
        }
        Ok(())
    }
}

struct Collected<T> {
    items: Vec<T>,
    outcome: Option<Result<()>>,
}

struct Collector<T> {
    state: Mutex<Collected<T>>,
    finished: Condvar,
}

impl<T> Collector<T> {
    fn finish(&self, outcome: Result<()>) {
        self.state.lock().outcome = Some(outcome);
        self.finished.notify_all();
    }
}

struct CollectSink<T>(Arc<Collector<T>>);

impl<T: Send + 'static> Sink<T> for CollectSink<T> {
    fn on_item(&mut self, item: T) {
        self.0.state.lock().items.push(item);
    }

    fn on_complete(&mut self) {
        self.0.finish(Ok(()));
    }

    fn on_error(&mut self, error: RippleError) {
        self.0.finish(Err(error));
    }
}

fn collect<T: Send + 'static>(
    observable: &Observable<T>,
    timeout: Option<Duration>,
) -> Result<Vec<T>> {
    let collector = Arc::new(Collector {
        state: Mutex::new(Collected {
            items: Vec::new(),
            outcome: None,
        }),
        finished: Condvar::new(),
    });

    let subscription = observable.subscribe(CollectSink(Arc::clone(&collector)));
    let deadline = timeout.map(|timeout| (Instant::now() + timeout, timeout));

    let mut state = collector.state.lock();
    loop {
        if let Some(outcome) = state.outcome.take() {
            return outcome.map(|()| mem::take(&mut state.items));
        }

        match deadline {
            Some((at, timeout)) => {
                if collector.finished.wait_until(&mut state, at).timed_out()
                    && state.outcome.is_none()
                {
                    drop(state);
                    subscription.dispose();
                    warn!("blocking_collect timed out after {:?}", timeout);
                    return Err(RippleError::timeout("blocking_collect", timeout));
                }
            }
            None => collector.finished.wait(&mut state),
        }
    }
}
