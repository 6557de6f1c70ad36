// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::event_loop::EventLoop;
use ripple_core::{Job, Scheduler, Worker};
use ripple_error::Result;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Gives every worker its own OS thread.
///
/// The thread exits when the worker is disposed, or once it is idle after
/// the last handle to the worker was dropped.
#[derive(Clone)]
pub struct NewThreadScheduler {
    name_prefix: Arc<str>,
    spawned: Arc<AtomicUsize>,
}

impl NewThreadScheduler {
    /// Threads are named `{name_prefix}-{n}`.
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: Arc::from(name_prefix.into()),
            spawned: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Default for NewThreadScheduler {
    fn default() -> Self {
        Self::new("ripple-new-thread")
    }
}

impl Scheduler for NewThreadScheduler {
    fn create_worker(&self) -> Arc<dyn Worker> {
        let n = self.spawned.fetch_add(1, Ordering::Relaxed);
        Arc::new(ThreadWorker {
            event_loop: EventLoop::spawn(format!("{}-{}", self.name_prefix, n)),
        })
    }

    fn name(&self) -> &str {
        &self.name_prefix
    }
}

impl fmt::Debug for NewThreadScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewThreadScheduler")
            .field("name_prefix", &self.name_prefix)
            .field("spawned", &self.spawned.load(Ordering::Relaxed))
            .finish()
    }
}

struct ThreadWorker {
    event_loop: Arc<EventLoop>,
}

impl Worker for ThreadWorker {
    fn schedule(&self, job: Job) -> Result<()> {
        self.event_loop.submit(job)
    }

    fn schedule_after(&self, delay: Duration, job: Job) -> Result<()> {
        self.event_loop.submit_after(delay, job)
    }

    fn dispose(&self) {
        self.event_loop.shutdown();
    }

    fn is_disposed(&self) -> bool {
        self.event_loop.is_stopped()
    }
}

impl Drop for ThreadWorker {
    fn drop(&mut self) {
        self.event_loop.close();
    }
}
