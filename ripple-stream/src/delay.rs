// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time-shifting operator.

use crate::logging::debug;
use crate::stage::lift;
use parking_lot::Mutex;
use ripple_core::{CancellationToken, Emitter, Notification, Observable, Scheduler, Sink, Worker};
use ripple_error::RippleError;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Extension trait providing `delay` and `delay_on`.
pub trait DelayExt<T>: Sized {
    /// Shift items and completion by `delay` on the shared
    /// [`computation`](ripple_scheduler::computation) pool.
    ///
    /// Errors are forwarded immediately, dropping delayed items that did not
    /// run yet.
    fn delay(self, delay: Duration) -> Observable<T>;

    /// Like [`delay`](DelayExt::delay), on a worker of `scheduler`.
    ///
    /// Each subscription gets its own worker, so relative order is kept.
    fn delay_on<S>(self, delay: Duration, scheduler: S) -> Observable<T>
    where
        S: Scheduler;
}

impl<T: Send + 'static> DelayExt<T> for Observable<T> {
    fn delay(self, delay: Duration) -> Observable<T> {
        self.delay_on(delay, ripple_scheduler::computation())
    }

    fn delay_on<S>(self, delay: Duration, scheduler: S) -> Observable<T>
    where
        S: Scheduler,
    {
        lift(self, move |downstream: Emitter<T>, upstream| {
            let worker = scheduler.create_worker();
            let disposer = Arc::clone(&worker);
            downstream.token().on_cancel(move || disposer.dispose());
            DelaySink {
                delay,
                worker,
                downstream,
                upstream,
                due: Arc::new(Mutex::new(VecDeque::new())),
            }
        })
    }
}

struct DelaySink<T> {
    delay: Duration,
    worker: Arc<dyn Worker>,
    downstream: Emitter<T>,
    upstream: CancellationToken,
    /// Signals waiting for their timer, oldest first.
    due: Arc<Mutex<VecDeque<Notification<T>>>>,
}

impl<T: Send + 'static> DelaySink<T> {
    fn schedule(&self, notification: Notification<T>) {
        self.due.lock().push_back(notification);

        // Timers sharing a deadline may fire in any order, so each one
        // releases the oldest signal rather than its own.
        let due = Arc::clone(&self.due);
        let downstream = self.downstream.clone();
        let job = Box::new(move || {
            let next = due.lock().pop_front();
            if let Some(notification) = next {
                downstream.forward(notification);
            }
        });
        if let Err(e) = self.worker.schedule_after(self.delay, job) {
            if self.downstream.is_cancelled() {
                debug!("delayed signal dropped after cancellation: {}", e);
                return;
            }
            self.upstream.cancel();
            self.downstream.forward(Notification::Failed(e));
        }
    }
}

impl<T: Send + 'static> Sink<T> for DelaySink<T> {
    fn on_item(&mut self, item: T) {
        self.schedule(Notification::Item(item));
    }

    fn on_complete(&mut self) {
        self.schedule(Notification::Completed);
    }

    fn on_error(&mut self, error: RippleError) {
        self.worker.dispose();
        self.due.lock().clear();
        self.downstream.forward(Notification::Failed(error));
    }
}
