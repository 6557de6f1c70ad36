// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::FlatMapExt;
use ripple_core::Observable;

/// Emit every item of each source in turn.
///
/// A source is only subscribed after its predecessor completed; an error
/// ends the chain without subscribing the remaining sources.
///
/// ```
/// use ripple_core::Observable;
/// use ripple_stream::concat;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// concat(vec![Observable::just(vec![1, 2]), Observable::just(vec![3])])
///     .subscribe_fn(move |x| sink.lock().unwrap().push(x));
///
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
/// ```
pub fn concat<T, I>(sources: I) -> Observable<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = Observable<T>>,
{
    let sources: Vec<Observable<T>> = sources.into_iter().collect();
    Observable::from_iterable(sources).concat_map(|source| source)
}

/// Extension trait providing `concat_with`.
pub trait ConcatExt<T>: Sized {
    /// Emit this stream's items, then `other`'s.
    fn concat_with(self, other: Observable<T>) -> Observable<T>;
}

impl<T: Send + 'static> ConcatExt<T> for Observable<T> {
    fn concat_with(self, other: Observable<T>) -> Observable<T> {
        concat([self, other])
    }
}
