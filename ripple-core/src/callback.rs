// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Panic containment for user callbacks.

use ripple_error::{Result, RippleError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run a user callback, converting a panic into [`RippleError::CallbackPanic`].
///
/// ```
/// use ripple_core::callback::catch_callback;
///
/// assert_eq!(catch_callback(|| 21 * 2).unwrap(), 42);
///
/// let err = catch_callback(|| -> i32 { panic!("bad input") }).unwrap_err();
/// assert!(err.to_string().contains("bad input"));
/// ```
///
/// # Errors
///
/// Returns `Err` if `f` panicked.
pub fn catch_callback<R, F>(f: F) -> Result<R>
where
    F: FnOnce() -> R,
{
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| RippleError::callback_panic(panic_message(payload.as_ref())))
}

/// Like [`catch_callback`] for callbacks that are themselves fallible.
///
/// # Errors
///
/// Returns the callback's error, or `CallbackPanic` if it panicked.
pub fn try_callback<R, F>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R>,
{
    catch_callback(f).and_then(|result| result)
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
