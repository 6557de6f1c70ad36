// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::event_loop::EventLoop;
use crate::logging::debug;
use ripple_core::{Job, Scheduler, Worker};
use ripple_error::{Result, RippleError};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Size and naming of a [`ThreadPoolScheduler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPoolConfig {
    threads: usize,
    name_prefix: String,
}

impl ThreadPoolConfig {
    /// # Errors
    ///
    /// Returns [`RippleError::InvalidConfiguration`] if `threads` is zero.
    pub fn new(threads: usize, name_prefix: impl Into<String>) -> Result<Self> {
        if threads == 0 {
            return Err(RippleError::invalid_configuration(
                "thread pool needs at least one thread",
            ));
        }
        Ok(Self {
            threads,
            name_prefix: name_prefix.into(),
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }
}

impl Default for ThreadPoolConfig {
    /// One thread per available core, named `ripple-computation-{n}`.
    fn default() -> Self {
        Self {
            threads: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            name_prefix: "ripple-computation".to_string(),
        }
    }
}

struct Pool {
    loops: Vec<Arc<EventLoop>>,
    next: AtomicUsize,
    name: String,
}

impl Drop for Pool {
    fn drop(&mut self) {
        for event_loop in &self.loops {
            event_loop.close();
        }
    }
}

/// Fixed set of threads shared by all of its workers.
///
/// Each worker is pinned to one pool thread (round-robin), which keeps its
/// jobs serial while different workers run in parallel. Cloning the
/// scheduler shares the pool; threads exit once every clone and every worker
/// is dropped and the queued work is done, or immediately on
/// [`shutdown`](Self::shutdown).
#[derive(Clone)]
pub struct ThreadPoolScheduler {
    pool: Arc<Pool>,
}

impl ThreadPoolScheduler {
    /// # Errors
    ///
    /// Returns [`RippleError::InvalidConfiguration`] if the configuration
    /// asks for zero threads.
    pub fn new(threads: usize, name_prefix: impl Into<String>) -> Result<Self> {
        ThreadPoolConfig::new(threads, name_prefix).map(Self::from_config)
    }

    pub fn from_config(config: ThreadPoolConfig) -> Self {
        let loops = (0..config.threads)
            .map(|n| EventLoop::spawn(format!("{}-{}", config.name_prefix, n)))
            .collect();

        debug!(
            "thread pool {} started with {} threads",
            config.name_prefix, config.threads
        );

        Self {
            pool: Arc::new(Pool {
                loops,
                next: AtomicUsize::new(0),
                name: config.name_prefix,
            }),
        }
    }

    pub fn threads(&self) -> usize {
        self.pool.loops.len()
    }

    /// Stop every pool thread, discarding queued work.
    pub fn shutdown(&self) {
        for event_loop in &self.pool.loops {
            event_loop.shutdown();
        }
    }
}

impl Scheduler for ThreadPoolScheduler {
    fn create_worker(&self) -> Arc<dyn Worker> {
        let slot = self.pool.next.fetch_add(1, Ordering::Relaxed) % self.pool.loops.len();
        Arc::new(PoolWorker {
            pool: Arc::clone(&self.pool),
            slot,
            disposed: Arc::new(AtomicBool::new(false)),
        })
    }

    fn name(&self) -> &str {
        &self.pool.name
    }
}

impl fmt::Debug for ThreadPoolScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPoolScheduler")
            .field("name", &self.pool.name)
            .field("threads", &self.pool.loops.len())
            .finish()
    }
}

// Holds the pool, not just its thread: a live worker keeps the pool running.
struct PoolWorker {
    pool: Arc<Pool>,
    slot: usize,
    disposed: Arc<AtomicBool>,
}

impl PoolWorker {
    fn event_loop(&self) -> &EventLoop {
        &self.pool.loops[self.slot]
    }

    fn guarded(&self, job: Job) -> Result<Job> {
        if self.is_disposed() {
            return Err(RippleError::scheduler_rejected(format!(
                "worker on {} is disposed",
                self.event_loop().name()
            )));
        }
        let disposed = Arc::clone(&self.disposed);
        Ok(Box::new(move || {
            if !disposed.load(Ordering::Acquire) {
                job();
            }
        }))
    }
}

impl Worker for PoolWorker {
    fn schedule(&self, job: Job) -> Result<()> {
        self.event_loop().submit(self.guarded(job)?)
    }

    fn schedule_after(&self, delay: Duration, job: Job) -> Result<()> {
        self.event_loop().submit_after(delay, self.guarded(job)?)
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
