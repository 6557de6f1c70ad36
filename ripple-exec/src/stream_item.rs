// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_error::{Result, RippleError};

/// One signal of an observable, as yielded by an
/// [`ObservableStream`](crate::ObservableStream).
///
/// Completion has no variant: the stream ends. An `Error` is always the last
/// item.
#[derive(Debug, Clone)]
pub enum StreamItem<T> {
    Value(T),
    Error(RippleError),
}

impl<T: PartialEq> PartialEq for StreamItem<T> {
    fn eq(&self, other: &Self) -> bool {
        // Terminal errors carry no identity.
        matches!((self, other), (StreamItem::Value(a), StreamItem::Value(b)) if a == b)
    }
}

impl<T> StreamItem<T> {
    /// The delivered value, or `None` for the terminal error.
    pub fn value(self) -> Option<T> {
        match self {
            StreamItem::Value(v) => Some(v),
            StreamItem::Error(_) => None,
        }
    }

    /// Returns `true` if the observable failed with this item.
    pub const fn is_error(&self) -> bool {
        matches!(self, StreamItem::Error(_))
    }

    /// `Ok(value)` for items, `Err` for the terminal error.
    ///
    /// # Errors
    ///
    /// Returns the error the observable failed with.
    pub fn into_result(self) -> Result<T> {
        match self {
            StreamItem::Value(v) => Ok(v),
            StreamItem::Error(e) => Err(e),
        }
    }
}

impl<T> From<Result<T>> for StreamItem<T> {
    fn from(result: Result<T>) -> Self {
        result.map_or_else(StreamItem::Error, StreamItem::Value)
    }
}
