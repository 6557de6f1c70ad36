// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::{BackpressureConfig, Observable, OverflowPolicy};
use ripple_scheduler::{new_thread, NewThreadScheduler};
use ripple_stream::prelude::*;
use ripple_test_utils::sources::counting_source;
use ripple_test_utils::{Recorder, DEFAULT_TIMEOUT};
use std::time::Duration;

#[test]
fn test_dropped_count_seen_through_downstream_operators() -> anyhow::Result<()> {
    // Arrange
    const TOTAL: u64 = 400;
    let recorder = Recorder::new();
    let config = BackpressureConfig::new(8, OverflowPolicy::DropIncoming)?;

    // Act
    let subscription = counting_source(TOTAL)
        .map(|x| x * 2)
        .observe_on_with(new_thread(), config)
        .map(|x| x / 2)
        .subscribe(recorder.sink().processing_delay(Duration::from_millis(1)));

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert!(recorder.is_completed());
    assert!(subscription.dropped_count() > 0);
    assert_eq!(
        recorder.item_count() as u64 + subscription.dropped_count(),
        TOTAL
    );
    Ok(())
}

#[test]
fn test_subscribe_on_and_observe_on_use_separate_threads() {
    // Arrange
    let recorder = Recorder::new();
    let producer = std::sync::Arc::new(parking_lot::Mutex::new(None));
    let seen = producer.clone();

    // Act
    Observable::create(move |emitter| {
        *seen.lock() = Some(std::thread::current().id());
        for i in 0..20 {
            emitter.next(i)?;
        }
        emitter.complete()
    })
    .subscribe_on(NewThreadScheduler::new("source-"))
    .observe_on(NewThreadScheduler::new("consumer-"))
    .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.items(), (0..20).collect::<Vec<_>>());
    let producer = producer.lock().expect("source activated");
    assert!(recorder.delivery_threads().iter().all(|t| *t != producer));
}
