// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::Observable;
use ripple_stream::prelude::*;
use ripple_test_utils::sources::{endless_source, randomly_delayed};
use ripple_test_utils::{wait_until, Recorder, DEFAULT_TIMEOUT};
use std::time::Duration;

#[test]
fn test_concat_then_take_releases_endless_tail() {
    // Arrange
    let recorder = Recorder::new();
    let (endless, stats) = endless_source(Duration::from_millis(1));

    // Act
    Observable::just(vec![100u64, 200])
        .concat_with(endless)
        .take(5)
        .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.items(), vec![100, 200, 0, 1, 2]);
    assert!(wait_until(DEFAULT_TIMEOUT, || stats.stopped() == 1));
}

#[test]
fn test_concat_of_mapped_delayed_sources() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    concat(vec![
        randomly_delayed(vec![1, 2], Duration::from_millis(2)).map(|x| x * 10),
        randomly_delayed(vec![3, 4], Duration::from_millis(2)).map(|x| x * 10),
    ])
    .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.items(), vec![10, 20, 30, 40]);
}
