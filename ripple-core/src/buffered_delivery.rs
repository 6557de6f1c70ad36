// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Buffered, demand-gated hand-off between an upstream producer and a sink.
//!
//! Upstream signals land in a [`BackpressureBuffer`]; a drain loop moves items
//! downstream while demand is outstanding, optionally on a scheduler worker.
//! Terminal signals wait until the buffer is empty. Pull-mode subscriptions
//! and `observe_on` are both built on this stage.

use crate::logging::{debug, warn};
use crate::{
    BackpressureBuffer, BackpressureConfig, CancellationToken, DeliveryControl, Demand, Emitter,
    Notification, Offer, Sink, Worker,
};
use parking_lot::Mutex;
use ripple_error::{Result, RippleError};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

pub struct BufferedDelivery<T> {
    me: Weak<Self>,
    buffer: BackpressureBuffer<T>,
    demand: Arc<Demand>,
    worker: Option<Arc<dyn Worker>>,
    downstream: Emitter<T>,
    upstream_token: CancellationToken,
    terminal: Mutex<Option<Notification<T>>>,
    wip: AtomicUsize,
    loss_reported: AtomicBool,
}

impl<T: Send + 'static> BufferedDelivery<T> {
    /// Create a stage delivering into `downstream`.
    ///
    /// With a `worker`, every sink call runs on it and the worker is disposed
    /// together with the subscription.
    pub fn new(
        config: &BackpressureConfig,
        demand: Arc<Demand>,
        worker: Option<Arc<dyn Worker>>,
        downstream: Emitter<T>,
    ) -> Arc<Self> {
        let upstream_token = downstream.token().child_token();

        if let Some(worker) = &worker {
            let worker = Arc::clone(worker);
            downstream.token().on_cancel(move || worker.dispose());
        }

        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            buffer: BackpressureBuffer::with_config(config),
            demand,
            worker,
            downstream,
            upstream_token,
            terminal: Mutex::new(None),
            wip: AtomicUsize::new(0),
            loss_reported: AtomicBool::new(false),
        })
    }

    /// The emitter the upstream source pushes into.
    pub fn upstream_emitter(self: &Arc<Self>) -> Emitter<T> {
        Emitter::from_parts(
            Box::new(StageSink(Arc::clone(self))),
            self.upstream_token.clone(),
            Some(Arc::clone(&self.demand)),
            self.downstream.losses(),
        )
    }

    /// Items currently waiting for demand.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Items this stage's overflow policy discarded so far.
    pub fn dropped_count(&self) -> u64 {
        self.buffer.dropped_count()
    }

    fn on_item(&self, item: T) {
        match self.buffer.offer(item) {
            Offer::Enqueued => self.demand.mark_buffered(),
            Offer::Dropped => self.report_loss(1),
            Offer::Replaced(discarded) => {
                self.demand.mark_buffered();
                self.demand.mark_released(discarded as u64);
                self.report_loss(discarded as u64);
            }
            Offer::Overflowed => {
                warn!(
                    "backpressure buffer overflow (capacity {}): failing subscription",
                    self.buffer.capacity()
                );
                self.upstream_token.cancel();
                self.on_terminal(Notification::Failed(RippleError::buffer_overflow(
                    self.buffer.capacity(),
                )));
                return;
            }
        }
        self.schedule();
    }

    fn report_loss(&self, lost: u64) {
        self.downstream.record_loss(lost);
        if !self.loss_reported.swap(true, Ordering::AcqRel) {
            warn!(
                "consumer is slower than its source: backpressure buffer (capacity {}, {:?}) is discarding items",
                self.buffer.capacity(),
                self.buffer.policy()
            );
        }
    }

    fn on_terminal(&self, notification: Notification<T>) {
        {
            let mut terminal = self.terminal.lock();
            if terminal.is_none() {
                *terminal = Some(notification);
            }
        }
        self.schedule();
    }

    fn schedule(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        match &self.worker {
            Some(worker) => {
                let Some(this) = self.me.upgrade() else {
                    return;
                };
                if let Err(e) = worker.schedule(Box::new(move || this.drain())) {
                    debug!("delivery worker rejected drain: {}", e);
                }
            }
            None => self.drain(),
        }
    }

    fn drain(&self) {
        let mut missed = 1;
        loop {
            loop {
                if self.downstream.is_cancelled() {
                    self.buffer.clear();
                    return;
                }

                // Read the terminal slot before the buffer: every item offered
                // before the terminal signal is then visible.
                let done = self.terminal.lock().is_some();
                if done && self.buffer.is_empty() {
                    if let Some(terminal) = self.terminal.lock().take() {
                        self.downstream.forward(terminal);
                    }
                    return;
                }

                if self.demand.outstanding() == 0 {
                    break;
                }
                let Some(item) = self.buffer.poll() else {
                    break;
                };
                self.demand.try_consume();
                self.demand.mark_released(1);
                self.downstream.forward(Notification::Item(item));
            }

            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }
}

impl<T: Send + 'static> DeliveryControl for BufferedDelivery<T> {
    fn request(&self, n: u64) -> Result<()> {
        self.demand.request(n)?;
        self.schedule();
        Ok(())
    }

    fn outstanding(&self) -> u64 {
        self.demand.outstanding()
    }
}

impl<T> fmt::Debug for BufferedDelivery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedDelivery")
            .field("buffer", &self.buffer)
            .field("demand", &self.demand)
            .field("scheduled", &self.worker.is_some())
            .finish()
    }
}

struct StageSink<T>(Arc<BufferedDelivery<T>>);

impl<T: Send + 'static> Sink<T> for StageSink<T> {
    fn on_item(&mut self, item: T) {
        self.0.on_item(item);
    }

    fn on_complete(&mut self) {
        self.0.on_terminal(Notification::Completed);
    }

    fn on_error(&mut self, error: RippleError) {
        self.0.on_terminal(Notification::Failed(error));
    }
}
