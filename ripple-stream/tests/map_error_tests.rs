// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::{Observable, RippleError};
use ripple_stream::prelude::*;
use ripple_test_utils::sources::{endless_source, failing_source};
use ripple_test_utils::{wait_until, Recorder, TestError, DEFAULT_TIMEOUT};
use std::time::Duration;

#[test]
fn test_map_passes_errors_through() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    failing_source(vec![1, 2], RippleError::stream_error("upstream broke"))
        .map(|x: i32| x + 1)
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec![2, 3]);
    let err = recorder.error().expect("error expected");
    assert!(err.to_string().contains("upstream broke"));
}

#[test]
fn test_map_panic_fails_and_releases_upstream() {
    // Arrange
    let recorder = Recorder::new();
    let (source, stats) = endless_source(Duration::from_millis(1));

    // Act
    source
        .map(|x| {
            assert!(x < 3, "value too large");
            x
        })
        .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.items(), vec![0, 1, 2]);
    let err = recorder.error().expect("error expected");
    assert!(matches!(err, RippleError::CallbackPanic { .. }));
    assert!(wait_until(DEFAULT_TIMEOUT, || stats.stopped() == 1));
    assert_eq!(recorder.terminal_count(), 1);
}

#[test]
fn test_try_map_err_becomes_single_error() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    Observable::just(vec!["1", "2", "x", "4"])
        .try_map(|s| s.parse::<i64>().map_err(|_| TestError::Boom))
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec![1, 2]);
    assert_eq!(recorder.inspect_error(RippleError::is_user_failure), Some(true));
    assert_eq!(recorder.terminal_count(), 1);
    assert_eq!(recorder.late_signals(), 0);
}
