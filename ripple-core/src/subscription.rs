// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::logging::error;
use crate::CancellationToken;
use ripple_error::{Result, RippleError};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The buffered delivery stage behind a subscription.
///
/// Receives demand signalled through [`Subscription::request`].
pub trait DeliveryControl: Send + Sync + 'static {
    /// Authorize `n` (> 0) more items.
    ///
    /// # Errors
    ///
    /// Implementations reject `n == 0` with [`RippleError::ProtocolViolation`].
    fn request(&self, n: u64) -> Result<()>;

    /// Items currently authorized but not yet delivered.
    fn outstanding(&self) -> u64;
}

/// Handle to a live subscription.
///
/// Returned by `subscribe` and handed to the sink's `on_subscribe`. Clones
/// refer to the same subscription. Dropping the handle does **not** cancel
/// the subscription; call [`dispose`](Self::dispose).
#[derive(Clone)]
pub struct Subscription {
    token: CancellationToken,
    control: Option<Arc<dyn DeliveryControl>>,
    pull: bool,
    losses: Arc<AtomicU64>,
}

impl Subscription {
    /// Handle for an unbounded-push subscription.
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            control: None,
            pull: false,
            losses: Arc::default(),
        }
    }

    /// Handle for a pull-mode subscription whose demand goes to `control`.
    pub fn pull(token: CancellationToken, control: Arc<dyn DeliveryControl>) -> Self {
        Self {
            token,
            control: Some(control),
            pull: true,
            losses: Arc::default(),
        }
    }

    /// Handle for a push subscription delivered through a buffered stage.
    pub fn buffered(token: CancellationToken, control: Arc<dyn DeliveryControl>) -> Self {
        Self {
            token,
            control: Some(control),
            pull: false,
            losses: Arc::default(),
        }
    }

    /// Report losses counted by the emitter chain feeding this subscription.
    pub(crate) fn with_losses(mut self, losses: Arc<AtomicU64>) -> Self {
        self.losses = losses;
        self
    }

    /// Stop delivery. Idempotent; safe to call from any thread, including
    /// from inside the sink.
    pub fn dispose(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the subscription was disposed or has terminated.
    pub fn is_disposed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Authorize `n` more items.
    ///
    /// Accepted and ignored for unbounded-push subscriptions.
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::ProtocolViolation`] if `n` is zero.
    pub fn request(&self, n: u64) -> Result<()> {
        if n == 0 {
            error!("protocol violation: request(0) on a subscription");
            return Err(RippleError::protocol_violation(
                "request(0): demand must be positive",
            ));
        }

        match &self.control {
            Some(control) if self.pull => control.request(n),
            _ => Ok(()),
        }
    }

    /// Outstanding demand; `u64::MAX` for push subscriptions.
    pub fn outstanding(&self) -> u64 {
        match &self.control {
            Some(control) if self.pull => control.outstanding(),
            _ => crate::demand::UNBOUNDED,
        }
    }

    /// Items discarded so far by overflow policies anywhere in front of the
    /// sink: the subscription's own buffer and every bounded `observe_on`
    /// stage of the chain.
    pub fn dropped_count(&self) -> u64 {
        self.losses.load(Ordering::Acquire)
    }

    /// Returns `true` if delivery is governed by `request(n)`.
    pub const fn is_pull(&self) -> bool {
        self.pull
    }

    /// The token backing this subscription.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .field("pull", &self.pull)
            .field("dropped", &self.dropped_count())
            .finish()
    }
}
