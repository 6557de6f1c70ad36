// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Shared, idempotent cancellation flag.
//!
//! Every subscription owns a [`CancellationToken`]. Operator stages subscribe to
//! their upstream with a [child](CancellationToken::child_token) of their
//! downstream token: cancelling a subscription therefore cascades towards the
//! producer, while a stage can still release its own upstream (for example
//! `take` after its last item) without cancelling what lies downstream.

use event_listener::{Event, EventListener, Listener};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

type CancelCallback = Box<dyn FnOnce() + Send + 'static>;

/// Cancellation state shared by every clone of a token.
///
/// The flag only ever transitions from `false` to `true`.
///
/// # Example
///
/// ```
/// use ripple_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let child = token.child_token();
/// assert!(!child.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// assert!(child.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    event: Event,
    children: Mutex<Vec<Weak<Inner>>>,
    callbacks: Mutex<Vec<CancelCallback>>,
}

impl CancellationToken {
    /// Create a new, uncancelled token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                event: Event::new(),
                children: Mutex::new(Vec::new()),
                callbacks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Cancel the token, its children and run the registered callbacks.
    ///
    /// This method is idempotent: only the first call has any effect.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }

        self.inner.event.notify(usize::MAX);

        // Flag is set before the lists are taken, so registrations racing with
        // this call observe it under the same lock and run inline instead.
        let children = mem::take(&mut *self.inner.children.lock());
        let callbacks = mem::take(&mut *self.inner.callbacks.lock());

        for child in children {
            if let Some(inner) = child.upgrade() {
                CancellationToken { inner }.cancel();
            }
        }
        for callback in callbacks {
            callback();
        }
    }

    /// Check if the token has been cancelled (non-blocking).
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Create a token that is cancelled whenever this one is.
    ///
    /// Cancelling the child never affects the parent. Children are held
    /// weakly; dropped children are pruned on the next registration.
    pub fn child_token(&self) -> CancellationToken {
        let child = CancellationToken::new();
        {
            let mut children = self.inner.children.lock();
            if !self.is_cancelled() {
                children.retain(|c| c.strong_count() > 0);
                children.push(Arc::downgrade(&child.inner));
                return child;
            }
        }
        child.cancel();
        child
    }

    /// Run `callback` once the token is cancelled.
    ///
    /// Runs immediately, on the calling thread, if the token is already
    /// cancelled. Otherwise it runs on the thread that calls [`cancel`](Self::cancel).
    pub fn on_cancel<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut callbacks = self.inner.callbacks.lock();
            if !self.is_cancelled() {
                callbacks.push(Box::new(callback));
                return;
            }
        }
        callback();
    }

    /// Block the current thread until the token is cancelled.
    pub fn wait(&self) {
        while !self.is_cancelled() {
            let listener = self.inner.event.listen();
            if self.is_cancelled() {
                return;
            }
            listener.wait();
        }
    }

    /// Block until the token is cancelled or `timeout` elapses.
    ///
    /// Returns `true` if the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_cancelled() {
                return true;
            }
            let listener = self.inner.event.listen();
            if self.is_cancelled() {
                return true;
            }
            if listener.wait_deadline(deadline).is_none() {
                return self.is_cancelled();
            }
        }
    }

    /// Wait asynchronously until the token is cancelled.
    ///
    /// If the token is already cancelled, this returns immediately.
    ///
    /// ```
    /// use ripple_core::CancellationToken;
    ///
    /// # async fn example() {
    /// let token = CancellationToken::new();
    /// let token_clone = token.clone();
    ///
    /// tokio::spawn(async move {
    ///     token_clone.cancelled().await;
    /// });
    ///
    /// token.cancel();
    /// # }
    /// ```
    pub fn cancelled(&self) -> Cancelled<'_> {
        Cancelled {
            token: self,
            listener: None,
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Future returned by [`CancellationToken::cancelled()`].
pub struct Cancelled<'a> {
    token: &'a CancellationToken,
    listener: Option<EventListener>,
}

impl Future for Cancelled<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        loop {
            if self.token.is_cancelled() {
                return Poll::Ready(());
            }

            if let Some(listener) = self.listener.as_mut() {
                if Pin::new(listener).poll(cx).is_pending() {
                    return Poll::Pending;
                }
                self.listener = None;
            } else {
                // Re-checked at the top of the loop: cancel() may have run
                // between the first check and listen()
                let listener = self.token.inner.event.listen();
                self.listener = Some(listener);
            }
        }
    }
}
