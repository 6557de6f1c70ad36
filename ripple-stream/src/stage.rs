// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::{CancellationToken, Emitter, Observable, Sink};

/// Build an operator from a per-subscription stage.
///
/// On every subscription, `make` receives the downstream emitter and the
/// token of the upstream subscription (a child of the downstream token) and
/// returns the sink the upstream pushes into.
pub(crate) fn lift<T, U, S, M>(source: Observable<T>, make: M) -> Observable<U>
where
    T: Send + 'static,
    U: Send + 'static,
    S: Sink<T>,
    M: Fn(Emitter<U>, CancellationToken) -> S + Send + Sync + 'static,
{
    Observable::from_source(move |downstream: Emitter<U>| {
        let upstream = downstream.upstream(|token| make(downstream.clone(), token));
        source.activate(upstream);
    })
}
