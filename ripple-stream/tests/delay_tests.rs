// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::Observable;
use ripple_scheduler::NewThreadScheduler;
use ripple_stream::prelude::*;
use ripple_test_utils::sources::threaded_counter;
use ripple_test_utils::{Recorder, DEFAULT_TIMEOUT};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_delay_shifts_items_and_completion() {
    // Arrange
    let recorder = Recorder::new();
    let started = Instant::now();

    // Act
    Observable::just(vec![1, 2, 3])
        .delay(Duration::from_millis(40))
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.event_count(), 0);
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert!(started.elapsed() >= Duration::from_millis(40));
    assert_eq!(recorder.items(), vec![1, 2, 3]);
    assert!(recorder.is_completed());
}

#[test]
fn test_delay_on_custom_scheduler_keeps_order() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    threaded_counter(50, Duration::ZERO)
        .delay_on(Duration::from_millis(5), NewThreadScheduler::new("delay-"))
        .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.items(), (1..=50).collect::<Vec<_>>());
    assert_eq!(recorder.late_signals(), 0);
}

#[test]
fn test_delay_keeps_order_of_items_emitted_together() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    Observable::from_iterable(0..200)
        .delay(Duration::from_millis(10))
        .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.items(), (0..200).collect::<Vec<_>>());
    assert!(recorder.is_completed());
}

#[test]
fn test_delay_dispose_discards_pending_items() {
    // Arrange
    let recorder = Recorder::<i32>::new();
    let subscription = Observable::just(vec![1, 2, 3])
        .delay(Duration::from_millis(50))
        .subscribe(recorder.sink());

    // Act
    subscription.dispose();

    // Assert
    thread::sleep(Duration::from_millis(100));
    assert_eq!(recorder.event_count(), 0);
}
