// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::logging::error;
use ripple_core::callback::catch_callback;
use ripple_core::{Job, Scheduler, Worker};
use ripple_error::{Result, RippleError};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

thread_local! {
    static QUEUE: RefCell<VecDeque<Job>> = const { RefCell::new(VecDeque::new()) };
    static DRAINING: Cell<bool> = const { Cell::new(false) };
}

/// Runs work on the thread that schedules it.
///
/// A job scheduled while another trampolined job runs on the same thread is
/// queued and runs after it, instead of nesting. `schedule_after` sleeps the
/// calling thread; delayed jobs keep submission order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrampolineScheduler;

impl Scheduler for TrampolineScheduler {
    fn create_worker(&self) -> Arc<dyn Worker> {
        Arc::new(TrampolineWorker {
            disposed: Arc::new(AtomicBool::new(false)),
        })
    }

    fn name(&self) -> &str {
        "trampoline"
    }
}

struct TrampolineWorker {
    disposed: Arc<AtomicBool>,
}

impl TrampolineWorker {
    fn enqueue(&self, job: Job) -> Result<()> {
        if self.is_disposed() {
            return Err(RippleError::scheduler_rejected("trampoline worker is disposed"));
        }

        let disposed = Arc::clone(&self.disposed);
        QUEUE.with(|queue| {
            queue.borrow_mut().push_back(Box::new(move || {
                if !disposed.load(Ordering::Acquire) {
                    job();
                }
            }));
        });

        if DRAINING.with(Cell::get) {
            return Ok(());
        }

        DRAINING.with(|draining| draining.set(true));
        while let Some(job) = QUEUE.with(|queue| queue.borrow_mut().pop_front()) {
            if let Err(e) = catch_callback(job) {
                error!("trampolined job panicked: {}", e);
            }
        }
        DRAINING.with(|draining| draining.set(false));
        Ok(())
    }
}

impl Worker for TrampolineWorker {
    fn schedule(&self, job: Job) -> Result<()> {
        self.enqueue(job)
    }

    fn schedule_after(&self, delay: Duration, job: Job) -> Result<()> {
        self.enqueue(Box::new(move || {
            thread::sleep(delay);
            job();
        }))
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
