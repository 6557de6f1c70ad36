// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Schedulers for the Ripple reactive stream engine.
//!
//! | Scheduler | Worker |
//! |-----------|--------|
//! | [`NewThreadScheduler`] | a dedicated OS thread per worker |
//! | [`ThreadPoolScheduler`] | a slot of a fixed-size pool, assigned round-robin |
//! | [`TrampolineScheduler`] | the calling thread, through a thread-local FIFO queue |
//!
//! Every worker runs its jobs one at a time, in submission order. A panicking
//! job is logged and does not take its thread down. Scheduler threads each
//! drive a current-thread tokio runtime; delayed jobs sleep on `tokio::time`.
//!
//! ```
//! use ripple_core::{Scheduler, Worker};
//! use std::sync::mpsc;
//!
//! let worker = ripple_scheduler::new_thread().create_worker();
//! let (tx, rx) = mpsc::channel();
//! worker.schedule(Box::new(move || tx.send(21 * 2).unwrap())).unwrap();
//!
//! assert_eq!(rx.recv().unwrap(), 42);
//! worker.dispose();
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

mod event_loop;
pub mod new_thread;
pub mod thread_pool;
pub mod trampoline;

pub use self::new_thread::NewThreadScheduler;
pub use self::thread_pool::{ThreadPoolConfig, ThreadPoolScheduler};
pub use self::trampoline::TrampolineScheduler;

use std::sync::OnceLock;

static COMPUTATION: OnceLock<ThreadPoolScheduler> = OnceLock::new();

/// Shared pool sized to the available parallelism, for CPU-bound work.
pub fn computation() -> ThreadPoolScheduler {
    COMPUTATION
        .get_or_init(|| ThreadPoolScheduler::from_config(ThreadPoolConfig::default()))
        .clone()
}

/// A scheduler whose workers each own a fresh thread.
pub fn new_thread() -> NewThreadScheduler {
    NewThreadScheduler::default()
}

/// A scheduler that runs work on the calling thread, queued.
pub const fn trampoline() -> TrampolineScheduler {
    TrampolineScheduler
}
