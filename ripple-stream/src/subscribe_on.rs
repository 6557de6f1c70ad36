// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::logging::{debug, warn};
use ripple_core::{Emitter, Notification, Observable, Scheduler};

/// Extension trait providing the `subscribe_on` operator.
pub trait SubscribeOnExt<T>: Sized {
    /// Activate the source on a worker of `scheduler` instead of the
    /// subscribing thread.
    ///
    /// `subscribe` returns right after handing the activation to the worker.
    /// The worker is disposed together with the subscription. Where the
    /// items are delivered depends on the source; combine with
    /// [`observe_on`](crate::ObserveOnExt::observe_on) to pin delivery too.
    ///
    /// ```
    /// use ripple_core::Observable;
    /// use ripple_scheduler::new_thread;
    /// use ripple_stream::SubscribeOnExt;
    /// use std::sync::mpsc;
    ///
    /// let (tx, rx) = mpsc::channel();
    /// Observable::just(vec![1])
    ///     .subscribe_on(new_thread())
    ///     .subscribe_fn(move |_| tx.send(std::thread::current().id()).unwrap());
    ///
    /// assert_ne!(rx.recv().unwrap(), std::thread::current().id());
    /// ```
    fn subscribe_on<S>(self, scheduler: S) -> Observable<T>
    where
        S: Scheduler;
}

impl<T: Send + 'static> SubscribeOnExt<T> for Observable<T> {
    fn subscribe_on<S>(self, scheduler: S) -> Observable<T>
    where
        S: Scheduler,
    {
        Observable::from_source(move |downstream: Emitter<T>| {
            let worker = scheduler.create_worker();
            let disposer = worker.clone();
            downstream.token().on_cancel(move || disposer.dispose());

            let source = self.clone();
            let emitter = downstream.clone();
            if let Err(e) = worker.schedule(Box::new(move || source.activate(emitter))) {
                if downstream.is_cancelled() {
                    debug!("activation skipped, subscription already cancelled");
                    return;
                }
                warn!("{} rejected activation: {}", scheduler.name(), e);
                downstream.forward(Notification::Failed(e));
            }
        })
    }
}
