// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::Observable;
use ripple_stream::prelude::*;
use ripple_test_utils::sources::endless_source;
use ripple_test_utils::{wait_until, Recorder, DEFAULT_TIMEOUT};
use std::time::Duration;

#[test]
fn test_flat_map_take_stops_every_inner() {
    // Arrange
    let recorder = Recorder::new();
    let (endless, stats) = endless_source(Duration::from_millis(1));

    // Act
    Observable::just(vec![1, 2, 3])
        .flat_map(move |_| endless.clone())
        .take(10)
        .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.item_count(), 10);
    assert!(recorder.is_completed());
    assert!(wait_until(DEFAULT_TIMEOUT, || stats.stopped() == 3));
}

#[test]
fn test_filter_concat_map_take() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    Observable::from_iterable(1..=10)
        .filter(|x| x % 3 == 0)
        .concat_map(|x| Observable::just(vec![x, -x]))
        .take(4)
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec![3, -3, 6, -6]);
    assert!(recorder.is_completed());
}
