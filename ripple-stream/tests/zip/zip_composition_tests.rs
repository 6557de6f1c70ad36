// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::Observable;
use ripple_scheduler::new_thread;
use ripple_stream::prelude::*;
use ripple_test_utils::sources::threaded_counter;
use ripple_test_utils::{Recorder, DEFAULT_TIMEOUT};
use std::time::Duration;

#[test]
fn test_zip_of_transformed_sources() {
    // Arrange
    let recorder = Recorder::new();
    let evens = Observable::from_iterable(0..20).filter(|x| x % 2 == 0);
    let labels = Observable::from_iterable(0..5).map(|x| format!("#{x}"));

    // Act
    evens
        .zip_with(labels, |n, label| format!("{label}={n}"))
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec!["#0=0", "#1=2", "#2=4", "#3=6", "#4=8"]);
    assert!(recorder.is_completed());
}

#[test]
fn test_zip_then_observe_on_keeps_pairs() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    threaded_counter(50, Duration::ZERO)
        .zip(threaded_counter(50, Duration::ZERO).map(|x| x * 100))
        .observe_on(new_thread())
        .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    let expected: Vec<(u64, u64)> = (1..=50).map(|x| (x, x * 100)).collect();
    assert_eq!(recorder.items(), expected);
}
