// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Moving delivery onto a scheduler.

use ripple_core::{BackpressureConfig, BufferedDelivery, Demand, Emitter, Observable, Scheduler};
use std::sync::Arc;

/// Extension trait providing `observe_on` and `observe_on_with`.
pub trait ObserveOnExt<T>: Sized {
    /// Deliver every downstream signal on one worker of `scheduler`.
    ///
    /// Signals are handed over through an unbounded FIFO buffer: the
    /// upstream never blocks and nothing is lost.
    ///
    /// # See Also
    ///
    /// - [`SubscribeOnExt::subscribe_on`](crate::SubscribeOnExt::subscribe_on) - Move activation instead
    /// - [`ripple_core::SubscribeOptions::deliver_on`] - The same policy applied at subscription time
    fn observe_on<S>(self, scheduler: S) -> Observable<T>
    where
        S: Scheduler;

    /// Like [`observe_on`](ObserveOnExt::observe_on) with a bounded hand-off
    /// buffer.
    ///
    /// When the worker falls behind, `config`'s overflow policy decides:
    /// drop the incoming item, replace the oldest, or fail the subscription
    /// with [`ripple_core::RippleError::BufferOverflow`].
    fn observe_on_with<S>(self, scheduler: S, config: BackpressureConfig) -> Observable<T>
    where
        S: Scheduler;
}

impl<T: Send + 'static> ObserveOnExt<T> for Observable<T> {
    fn observe_on<S>(self, scheduler: S) -> Observable<T>
    where
        S: Scheduler,
    {
        self.observe_on_with(scheduler, BackpressureConfig::unbounded())
    }

    fn observe_on_with<S>(self, scheduler: S, config: BackpressureConfig) -> Observable<T>
    where
        S: Scheduler,
    {
        Observable::from_source(move |downstream: Emitter<T>| {
            let worker = scheduler.create_worker();
            let stage = BufferedDelivery::new(
                &config,
                Arc::new(Demand::unbounded()),
                Some(worker),
                downstream,
            );
            self.activate(stage.upstream_emitter());
        })
    }
}
