// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{OverflowPolicy, Scheduler, DEFAULT_BUFFER_CAPACITY};
use ripple_error::{Result, RippleError};
use std::fmt;
use std::sync::Arc;

/// Capacity and overflow policy of a backpressure buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackpressureConfig {
    capacity: usize,
    policy: OverflowPolicy,
}

impl BackpressureConfig {
    /// # Errors
    ///
    /// Returns [`RippleError::InvalidConfiguration`] if `capacity` is zero.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(RippleError::invalid_configuration(
                "backpressure buffer capacity must be at least 1",
            ));
        }
        Ok(Self { capacity, policy })
    }

    /// A buffer that never discards nor fails.
    pub const fn unbounded() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
            policy: OverflowPolicy::Unbounded,
        }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub const fn policy(&self) -> OverflowPolicy {
        self.policy
    }
}

impl Default for BackpressureConfig {
    /// [`DEFAULT_BUFFER_CAPACITY`] items, failing the subscription on overflow.
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
            policy: OverflowPolicy::Fail,
        }
    }
}

/// How a subscription delivers to its sink.
///
/// The default is unbounded push on the emitting thread. Setting
/// [`backpressure`](Self::backpressure) switches to pull mode: nothing is
/// delivered until the consumer calls `Subscription::request`. Setting
/// [`deliver_on`](Self::deliver_on) moves sink calls onto a worker of the
/// given scheduler.
///
/// ```
/// use ripple_core::{BackpressureConfig, OverflowPolicy, SubscribeOptions};
///
/// let options = SubscribeOptions::new()
///     .backpressure(BackpressureConfig::new(16, OverflowPolicy::KeepLatest).unwrap());
/// assert_eq!(options.backpressure_config().map(|c| c.capacity()), Some(16));
/// ```
#[derive(Clone, Default)]
pub struct SubscribeOptions {
    backpressure: Option<BackpressureConfig>,
    delivery: Option<Arc<dyn Scheduler>>,
}

impl SubscribeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opt in to pull mode with the given buffer.
    #[must_use]
    pub fn backpressure(mut self, config: BackpressureConfig) -> Self {
        self.backpressure = Some(config);
        self
    }

    /// Deliver to the sink on a worker of `scheduler`.
    #[must_use]
    pub fn deliver_on<S: Scheduler>(mut self, scheduler: S) -> Self {
        self.delivery = Some(Arc::new(scheduler));
        self
    }

    pub fn backpressure_config(&self) -> Option<&BackpressureConfig> {
        self.backpressure.as_ref()
    }

    pub fn delivery_scheduler(&self) -> Option<&Arc<dyn Scheduler>> {
        self.delivery.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Option<BackpressureConfig>, Option<Arc<dyn Scheduler>>) {
        (self.backpressure, self.delivery)
    }
}

impl fmt::Debug for SubscribeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeOptions")
            .field("backpressure", &self.backpressure)
            .field("deliver_on", &self.delivery.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}
