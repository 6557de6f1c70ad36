// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Consumer side of a subscription.

use crate::logging::error;
use crate::Subscription;
use ripple_error::RippleError;

/// Receiver of items and of one terminal signal.
///
/// The engine calls a sink serially: never from two threads at once, never
/// after `on_complete`/`on_error`, and never after the subscription was
/// disposed. `on_subscribe` is always the first call.
///
/// ```
/// use ripple_core::{Observable, RippleError, Sink, Subscription};
/// use std::sync::{Arc, Mutex};
///
/// struct Collect(Arc<Mutex<Vec<i32>>>);
///
/// impl Sink<i32> for Collect {
///     fn on_item(&mut self, item: i32) {
///         self.0.lock().unwrap().push(item);
///     }
///     fn on_complete(&mut self) {}
///     fn on_error(&mut self, _error: RippleError) {}
/// }
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// Observable::just(vec![1, 2, 3]).subscribe(Collect(seen.clone()));
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
/// ```
pub trait Sink<T>: Send + 'static {
    /// Receives the handle of the new subscription before any item.
    fn on_subscribe(&mut self, subscription: Subscription) {
        let _ = subscription;
    }

    /// Receives the next item.
    fn on_item(&mut self, item: T);

    /// The source finished; no further calls follow.
    fn on_complete(&mut self);

    /// The source or a stage failed; no further calls follow.
    fn on_error(&mut self, error: RippleError);
}

impl<T: 'static> Sink<T> for Box<dyn Sink<T>> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        (**self).on_subscribe(subscription);
    }

    fn on_item(&mut self, item: T) {
        (**self).on_item(item);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }

    fn on_error(&mut self, error: RippleError) {
        (**self).on_error(error);
    }
}

type ItemFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnMut(RippleError) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;
type SubscribeFn = Box<dyn FnMut(Subscription) + Send>;

/// A [`Sink`] assembled from closures.
///
/// Without an error handler, errors are logged at error level instead of
/// being silently lost.
///
/// ```
/// use ripple_core::{FnSink, Observable};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let sum = Arc::new(AtomicUsize::new(0));
/// let done = Arc::new(AtomicUsize::new(0));
///
/// let (s, d) = (sum.clone(), done.clone());
/// Observable::just(vec![1, 2, 3]).subscribe(
///     FnSink::new(move |x: usize| {
///         s.fetch_add(x, Ordering::SeqCst);
///     })
///     .with_complete(move || {
///         d.fetch_add(1, Ordering::SeqCst);
///     }),
/// );
///
/// assert_eq!(sum.load(Ordering::SeqCst), 6);
/// assert_eq!(done.load(Ordering::SeqCst), 1);
/// ```
pub struct FnSink<T> {
    on_item: ItemFn<T>,
    on_error: Option<ErrorFn>,
    on_complete: Option<CompleteFn>,
    on_subscribe: Option<SubscribeFn>,
}

impl<T> FnSink<T> {
    /// Create a sink that calls `on_item` for every item.
    pub fn new<F>(on_item: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        Self {
            on_item: Box::new(on_item),
            on_error: None,
            on_complete: None,
            on_subscribe: None,
        }
    }

    /// Handle the terminal error.
    #[must_use]
    pub fn with_error<F>(mut self, on_error: F) -> Self
    where
        F: FnMut(RippleError) + Send + 'static,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// Handle completion.
    #[must_use]
    pub fn with_complete<F>(mut self, on_complete: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    /// Receive the subscription handle before the first item.
    #[must_use]
    pub fn with_subscribe<F>(mut self, on_subscribe: F) -> Self
    where
        F: FnMut(Subscription) + Send + 'static,
    {
        self.on_subscribe = Some(Box::new(on_subscribe));
        self
    }
}

impl<T: 'static> Sink<T> for FnSink<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        if let Some(on_subscribe) = self.on_subscribe.as_mut() {
            on_subscribe(subscription);
        }
    }

    fn on_item(&mut self, item: T) {
        (self.on_item)(item);
    }

    fn on_complete(&mut self) {
        if let Some(on_complete) = self.on_complete.as_mut() {
            on_complete();
        }
    }

    fn on_error(&mut self, err: RippleError) {
        match self.on_error.as_mut() {
            Some(on_error) => on_error(err),
            None => error!("unhandled stream error: {}", err),
        }
    }
}
