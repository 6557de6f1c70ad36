// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Execution-context abstraction used by `subscribe_on`, `observe_on`,
//! `delay` and scheduled delivery.

use ripple_error::Result;
use std::sync::Arc;
use std::time::Duration;

/// A unit of work handed to a [`Worker`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A serial execution context obtained from a [`Scheduler`].
///
/// Jobs scheduled on one worker run one at a time, in submission order
/// (delayed jobs in deadline order). Jobs of different workers may run
/// concurrently.
pub trait Worker: Send + Sync + 'static {
    /// Run `job` as soon as possible.
    ///
    /// # Errors
    ///
    /// Returns [`ripple_error::RippleError::SchedulerRejected`] once the
    /// worker is disposed.
    fn schedule(&self, job: Job) -> Result<()>;

    /// Run `job` after `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`ripple_error::RippleError::SchedulerRejected`] once the
    /// worker is disposed.
    fn schedule_after(&self, delay: Duration, job: Job) -> Result<()>;

    /// Discard pending jobs and reject new ones. Idempotent.
    fn dispose(&self);

    /// Returns `true` once [`dispose`](Self::dispose) was called.
    fn is_disposed(&self) -> bool;
}

/// Factory of [`Worker`]s.
pub trait Scheduler: Send + Sync + 'static {
    /// Create a worker. Each subscription-level use gets its own worker.
    fn create_worker(&self) -> Arc<dyn Worker>;

    /// Short name used in log messages.
    fn name(&self) -> &str;
}

impl<S> Scheduler for Arc<S>
where
    S: Scheduler + ?Sized,
{
    fn create_worker(&self) -> Arc<dyn Worker> {
        (**self).create_worker()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
