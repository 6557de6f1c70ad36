// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_stream::prelude::*;
use ripple_test_utils::sources::{counting_source, endless_source};
use ripple_test_utils::{wait_until, Recorder, DEFAULT_TIMEOUT};
use std::thread;
use std::time::Duration;

#[test]
fn test_map_filter_take_chain() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    counting_source(100)
        .map(|x| x * 3)
        .filter(|x| x % 2 == 0)
        .take(4)
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec![6, 12, 18, 24]);
    assert!(recorder.is_completed());
    assert_eq!(recorder.terminal_count(), 1);
}

#[test]
fn test_dispose_releases_whole_chain() {
    // Arrange
    let recorder = Recorder::new();
    let (source, stats) = endless_source(Duration::from_millis(1));
    let subscription = source
        .map(|x| x + 1)
        .filter(|x| x % 2 == 0)
        .subscribe(recorder.sink());
    assert!(recorder.wait_for_items(3, DEFAULT_TIMEOUT));

    // Act
    subscription.dispose();

    // Assert
    assert!(wait_until(DEFAULT_TIMEOUT, || stats.stopped() == 1));
    let delivered = recorder.item_count();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(recorder.item_count(), delivered);
    assert!(!recorder.is_terminated());
}

#[test]
fn test_dispose_from_sink_inside_chain() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    counting_source(100)
        .map(|x| x * 10)
        .subscribe(recorder.sink().dispose_after(2));

    // Assert
    assert_eq!(recorder.items(), vec![10, 20]);
    assert!(!recorder.is_terminated());
}
