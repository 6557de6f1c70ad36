// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::{Emitter, Observable, RippleError};
use ripple_stream::prelude::*;
use ripple_test_utils::sources::failing_source;
use ripple_test_utils::Recorder;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_concat_error_ends_chain() {
    // Arrange
    let recorder = Recorder::new();
    let activations = Arc::new(AtomicUsize::new(0));
    let counter = activations.clone();
    let second = Observable::from_source(move |emitter: Emitter<i32>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Observable::just(vec![2, 3]).activate(emitter);
    });

    // Act
    concat(vec![
        failing_source(vec![1], RippleError::stream_error("first failed")),
        second,
    ])
    .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec![1]);
    assert!(recorder.error().is_some());
    assert_eq!(activations.load(Ordering::SeqCst), 0);
}
