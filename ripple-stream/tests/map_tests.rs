// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::{Observable, RippleError};
use ripple_stream::prelude::*;
use ripple_test_utils::sources::{counting_source, threaded_counter};
use ripple_test_utils::{Recorder, DEFAULT_TIMEOUT};
use std::time::Duration;

#[test]
fn test_map_transforms_in_order() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    counting_source(5).map(|x| x * 2).subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec![2, 4, 6, 8, 10]);
    assert!(recorder.is_completed());
}

#[test]
fn test_map_changes_item_type() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    Observable::just(vec![1, 22, 333])
        .map(|x: i32| x.to_string())
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec!["1", "22", "333"]);
}

#[test]
fn test_map_from_threaded_source() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    threaded_counter(100, Duration::ZERO)
        .map(|x| x + 1_000)
        .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.items(), (1_001..=1_100).collect::<Vec<_>>());
    assert_eq!(recorder.overlapping_calls(), 0);
}

#[test]
fn test_map_of_empty_completes() {
    // Arrange
    let recorder = Recorder::<i32>::new();

    // Act
    Observable::<i32>::empty()
        .map(|x| x * 2)
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.item_count(), 0);
    assert!(recorder.is_completed());
}

#[test]
fn test_try_map_ok_behaves_like_map() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    counting_source(3)
        .try_map(|x| Ok::<_, RippleError>(x * 100))
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec![100, 200, 300]);
    assert!(recorder.is_completed());
}
