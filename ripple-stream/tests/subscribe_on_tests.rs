// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use ripple_core::Observable;
use ripple_scheduler::{new_thread, NewThreadScheduler, TrampolineScheduler};
use ripple_stream::prelude::*;
use ripple_test_utils::sources::counting_source;
use ripple_test_utils::{Recorder, DEFAULT_TIMEOUT};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_subscribe_on_activates_off_caller_thread() {
    // Arrange
    let recorder = Recorder::new();
    let producer_thread = Arc::new(Mutex::new(None));
    let seen = producer_thread.clone();

    // Act
    Observable::create(move |emitter| {
        *seen.lock() = Some(thread::current().id());
        emitter.next(1)?;
        emitter.complete()
    })
    .subscribe_on(new_thread())
    .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    let producer = producer_thread.lock().expect("source activated");
    assert_ne!(producer, thread::current().id());
    assert_eq!(recorder.delivery_threads()[0], producer);
}

#[test]
fn test_subscribe_on_returns_before_source_finishes() {
    // Arrange
    let recorder = Recorder::new();
    let started = Instant::now();

    // Act
    Observable::create(|emitter| {
        thread::sleep(Duration::from_millis(50));
        emitter.next(1)?;
        emitter.complete()
    })
    .subscribe_on(NewThreadScheduler::new("slow-source"))
    .subscribe(recorder.sink());

    // Assert
    assert!(started.elapsed() < Duration::from_millis(50));
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.items(), vec![1]);
}

#[test]
fn test_subscribe_on_trampoline_runs_inline() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    counting_source(3)
        .subscribe_on(TrampolineScheduler)
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.items(), vec![1, 2, 3]);
    assert_eq!(recorder.delivery_threads()[0], thread::current().id());
}
