// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Sink;
use ripple_error::RippleError;

/// One signal travelling from a source to a sink.
///
/// A subscription carries any number of `Item`s followed by at most one
/// terminal signal (`Completed` or `Failed`).
#[derive(Debug, Clone)]
pub enum Notification<T> {
    /// A value
    Item(T),
    /// The source finished normally
    Completed,
    /// The source (or a stage) failed; terminates the subscription
    Failed(RippleError),
}

impl<T> Notification<T> {
    /// Returns `true` for `Completed` and `Failed`.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Item(_))
    }

    /// Returns `true` if this is an `Item`.
    pub const fn is_item(&self) -> bool {
        matches!(self, Notification::Item(_))
    }

    /// Converts into the carried item, discarding terminal signals.
    pub fn into_item(self) -> Option<T> {
        match self {
            Notification::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Maps the carried item; terminal signals are propagated unchanged.
    pub fn map<U, F>(self, f: F) -> Notification<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Notification::Item(item) => Notification::Item(f(item)),
            Notification::Completed => Notification::Completed,
            Notification::Failed(e) => Notification::Failed(e),
        }
    }

    /// Invoke the matching sink method.
    pub fn deliver_to<S>(self, sink: &mut S)
    where
        S: Sink<T> + ?Sized,
    {
        match self {
            Notification::Item(item) => sink.on_item(item),
            Notification::Completed => sink.on_complete(),
            Notification::Failed(e) => sink.on_error(e),
        }
    }
}

impl<T: PartialEq> PartialEq for Notification<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Notification::Item(a), Notification::Item(b)) => a == b,
            (Notification::Completed, Notification::Completed) => true,
            _ => false, // Errors are never equal
        }
    }
}

impl<T> From<Result<T, RippleError>> for Notification<T> {
    fn from(result: Result<T, RippleError>) -> Self {
        match result {
            Ok(item) => Notification::Item(item),
            Err(e) => Notification::Failed(e),
        }
    }
}
