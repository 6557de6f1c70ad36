// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use ripple_core::{
    CancellationToken, Emitter, Notification, RippleError, Sink, Subscription, UNBOUNDED,
};
use ripple_test_utils::Recorder;
use std::sync::Arc;
use std::thread;

fn recorded<T: Send + 'static>() -> (Emitter<T>, Recorder<T>) {
    let recorder = Recorder::new();
    let emitter = Emitter::new(recorder.sink(), CancellationToken::new());
    (emitter, recorder)
}

#[test]
fn test_items_then_completion_delivered_in_order() -> anyhow::Result<()> {
    // Arrange
    let (emitter, recorder) = recorded();

    // Act
    emitter.next(1)?;
    emitter.next(2)?;
    emitter.complete()?;

    // Assert
    assert_eq!(recorder.items(), vec![1, 2]);
    assert!(recorder.is_completed());
    Ok(())
}

#[test]
fn test_start_delivers_subscription_first() -> anyhow::Result<()> {
    // Arrange
    let token = CancellationToken::new();
    let recorder = Recorder::new();
    let emitter = Emitter::new(recorder.sink(), token.clone());

    // Act
    emitter.start(Subscription::new(token));
    emitter.next("a")?;

    // Assert
    assert_eq!(recorder.subscribe_calls(), 1);
    assert!(recorder.subscription().is_some());
    Ok(())
}

#[test]
fn test_item_after_completion_is_protocol_violation() -> anyhow::Result<()> {
    // Arrange
    let (emitter, recorder) = recorded();
    emitter.complete()?;

    // Act
    let err = emitter.next(4).unwrap_err();

    // Assert
    assert!(err.is_protocol_violation());
    assert!(recorder.items().is_empty());
    assert_eq!(recorder.late_signals(), 0);
    Ok(())
}

#[test]
fn test_second_terminal_is_protocol_violation() -> anyhow::Result<()> {
    // Arrange
    let (emitter, recorder) = recorded::<i32>();
    emitter.error(RippleError::stream_error("first"))?;

    // Act & Assert
    assert!(emitter.complete().unwrap_err().is_protocol_violation());
    assert!(emitter
        .error(RippleError::stream_error("second"))
        .unwrap_err()
        .is_protocol_violation());
    assert_eq!(recorder.terminal_count(), 1);
    Ok(())
}

#[test]
fn test_terminal_releases_token() -> anyhow::Result<()> {
    // Arrange
    let (emitter, _recorder) = recorded::<i32>();
    emitter.complete()?;

    // Act & Assert
    assert!(emitter.token().is_cancelled());
    assert!(emitter.is_cancelled());
    Ok(())
}

#[test]
fn test_signals_after_cancel_are_dropped_silently() -> anyhow::Result<()> {
    // Arrange
    let (emitter, recorder) = recorded();
    emitter.next(1)?;

    // Act
    emitter.token().cancel();
    emitter.next(2)?;
    emitter.complete()?;

    // Assert
    assert_eq!(recorder.items(), vec![1]);
    assert!(!recorder.is_terminated());
    Ok(())
}

#[test]
fn test_concurrent_producers_are_serialized() {
    // Arrange
    let (emitter, recorder) = recorded();

    // Act
    let producers: Vec<_> = (0..4u64)
        .map(|p| {
            let emitter = emitter.clone();
            thread::spawn(move || {
                for i in 0..1000 {
                    emitter
                        .next(p * 1000 + i)
                        .expect("emission before terminal rejected");
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer panicked");
    }

    // Assert
    assert_eq!(recorder.item_count(), 4000);
    assert_eq!(recorder.overlapping_calls(), 0);
}

#[test]
fn test_per_producer_order_preserved() {
    // Arrange
    let (emitter, recorder) = recorded();

    // Act
    let producers: Vec<_> = (0..2u64)
        .map(|p| {
            let emitter = emitter.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let _ = emitter.next((p, i));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer panicked");
    }

    // Assert
    for p in 0..2 {
        let sequence: Vec<u64> = recorder
            .items()
            .into_iter()
            .filter(|(producer, _)| *producer == p)
            .map(|(_, i)| i)
            .collect();
        assert_eq!(sequence, (0..500).collect::<Vec<_>>());
    }
}

struct Reentrant {
    emitter: Arc<Mutex<Option<Emitter<i32>>>>,
    seen: Arc<Mutex<Vec<i32>>>,
}

impl Sink<i32> for Reentrant {
    fn on_item(&mut self, item: i32) {
        self.seen.lock().push(item);
        if item == 1 {
            if let Some(emitter) = self.emitter.lock().clone() {
                let _ = emitter.next(100);
            }
        }
    }

    fn on_complete(&mut self) {}

    fn on_error(&mut self, _error: RippleError) {}
}

#[test]
fn test_reentrant_emission_is_queued_not_nested() -> anyhow::Result<()> {
    // Arrange
    let slot = Arc::new(Mutex::new(None));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let emitter = Emitter::new(
        Reentrant {
            emitter: slot.clone(),
            seen: seen.clone(),
        },
        CancellationToken::new(),
    );
    *slot.lock() = Some(emitter.clone());

    // Act
    emitter.next(1)?;
    emitter.next(2)?;

    // Assert
    assert_eq!(*seen.lock(), vec![1, 100, 2]);
    Ok(())
}

#[test]
fn test_forward_ignores_signals_after_terminal() {
    // Arrange
    let (emitter, recorder) = recorded();

    // Act
    emitter.forward(Notification::Item(1));
    emitter.forward(Notification::Completed);
    emitter.forward(Notification::Item(2));
    emitter.forward(Notification::Failed(RippleError::stream_error("late")));

    // Assert
    assert_eq!(recorder.items(), vec![1]);
    assert_eq!(recorder.terminal_count(), 1);
}

#[test]
fn test_upstream_token_is_child_of_downstream() {
    // Arrange
    let (emitter, _recorder) = recorded::<i32>();
    let upstream_recorder = Recorder::<i32>::new();
    let upstream = emitter.upstream(|_token| upstream_recorder.sink());

    // Act
    emitter.token().cancel();

    // Assert
    assert!(upstream.is_cancelled());
}

#[test]
fn test_upstream_cancel_leaves_downstream_running() -> anyhow::Result<()> {
    // Arrange
    let (emitter, recorder) = recorded::<i32>();
    let upstream = emitter.upstream(|_token| Recorder::<i32>::new().sink());

    // Act
    upstream.token().cancel();
    emitter.next(7)?;

    // Assert
    assert_eq!(recorder.items(), vec![7]);
    Ok(())
}

#[test]
fn test_push_emitter_reports_unbounded_demand() {
    // Arrange
    let (emitter, _recorder) = recorded::<i32>();

    // Act & Assert
    assert_eq!(emitter.requested(), UNBOUNDED);
    assert!(emitter.wait_for_demand(None));
}

#[test]
fn test_losses_recorded_upstream_are_seen_downstream() {
    // Arrange
    let (emitter, _recorder) = recorded::<i32>();
    let upstream = emitter.upstream(|_token| Recorder::<i32>::new().sink());
    let branch = emitter.branch(Recorder::<i32>::new().sink(), CancellationToken::new());

    // Act
    upstream.record_loss(3);
    branch.record_loss(2);

    // Assert
    assert_eq!(emitter.dropped_count(), 5);
    assert_eq!(upstream.dropped_count(), 5);
}

#[test]
fn test_push_emitter_does_not_register_demand_listener() {
    // Arrange
    let (emitter, _recorder) = recorded::<i32>();

    // Act & Assert
    assert!(!emitter.on_demand(|| {}));
}
