// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::{Emitter, Observable};
use ripple_stream::prelude::*;
use ripple_test_utils::sources::randomly_delayed;
use ripple_test_utils::{Recorder, DEFAULT_TIMEOUT};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_concat_map_preserves_lexicographic_order() {
    // Arrange
    let recorder = Recorder::new();
    let inner_items = |outer: u32| (0..5u32).map(move |i| (outer, i)).collect::<Vec<_>>();

    // Act
    Observable::from_iterable(0..8u32)
        .concat_map(move |o| randomly_delayed(inner_items(o), Duration::from_millis(2)))
        .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    let expected: Vec<_> = (0..8u32).flat_map(|o| (0..5u32).map(move |i| (o, i))).collect();
    assert_eq!(recorder.items(), expected);
    assert!(recorder.is_completed());
}

#[test]
fn test_concat_map_runs_one_inner_at_a_time() {
    // Arrange
    let recorder = Recorder::new();
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (a, p) = (active.clone(), peak.clone());

    // Act
    Observable::from_iterable(0..5u32)
        .concat_map(move |x| {
            let (active, peak) = (a.clone(), p.clone());
            Observable::from_source(move |emitter: Emitter<u32>| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                let active = active.clone();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(2));
                    let _ = emitter.next(x);
                    active.fetch_sub(1, Ordering::SeqCst);
                    let _ = emitter.complete();
                });
            })
        })
        .subscribe(recorder.sink());

    // Assert
    assert!(recorder.wait_for_terminal(DEFAULT_TIMEOUT));
    assert_eq!(recorder.items(), vec![0, 1, 2, 3, 4]);
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concat_map_many_synchronous_inners() {
    // Arrange
    let recorder = Recorder::new();

    // Act
    Observable::from_iterable(0..10_000u32)
        .concat_map(|x| Observable::just(vec![x]))
        .subscribe(recorder.sink());

    // Assert
    assert_eq!(recorder.item_count(), 10_000);
    assert!(recorder.is_completed());
}
