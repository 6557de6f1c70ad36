// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_stream::prelude::*;
use ripple_test_utils::sources::{counting_source, endless_source};
use ripple_test_utils::{wait_until, Recorder, DEFAULT_TIMEOUT};
use std::time::Duration;

#[test]
fn test_take_limits_and_completes() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    counting_source(100).take(3).subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec![1, 2, 3]);
    assert!(recorder.is_completed());
    assert_eq!(recorder.terminal_count(), 1);
}

#[test]
fn test_take_more_than_available() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    counting_source(2).take(10).subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec![1, 2]);
    assert!(recorder.is_completed());
}

#[test]
fn test_take_zero_never_activates_source() {
    // Arrange
    let recorder = Recorder::<u64>::new();
    let (source, stats) = endless_source(Duration::from_millis(1));

    // Act
    source.take(0).subscribe(recorder.sink());

    // Assert
    assert!(recorder.is_completed());
    assert_eq!(recorder.item_count(), 0);
    assert_eq!(stats.activations(), 0);
}

#[test]
fn test_take_stops_endless_producer() {
    // Arrange
    let recorder = Recorder::new();
    let (source, stats) = endless_source(Duration::from_millis(1));

    // Act
    let subscription = source.take(5).subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.items(), vec![0, 1, 2, 3, 4]);
    assert!(recorder.is_completed());
    assert!(wait_until(DEFAULT_TIMEOUT, || stats.stopped() == 1));
    assert!(subscription.is_disposed());
}
