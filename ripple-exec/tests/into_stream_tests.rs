// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::StreamExt;
use ripple_core::{Observable, RippleError};
use ripple_exec::{IntoStreamExt, StreamItem};
use ripple_stream::prelude::*;
use ripple_test_utils::sources::{endless_source, failing_source, threaded_counter};
use ripple_test_utils::{wait_until, DEFAULT_TIMEOUT};
use std::time::Duration;

#[tokio::test]
async fn test_into_stream_yields_values_then_ends() -> anyhow::Result<()> {
    // Arrange
    let mut stream = Observable::from_iterable(1..=3).map(|x| x * 2).into_stream();

    // Act
    let mut values = Vec::new();
    while let Some(item) = stream.next().await {
        values.push(item.value().expect("value expected"));
    }

    // Assert
    assert_eq!(values, vec![2, 4, 6]);
    Ok(())
}

#[tokio::test]
async fn test_into_stream_from_threaded_source() -> anyhow::Result<()> {
    // Arrange
    let stream = threaded_counter(50, Duration::ZERO).into_stream();

    // Act
    let values: Vec<u64> = stream.filter_map(|item| async move { item.value() }).collect().await;

    // Assert
    assert_eq!(values, (1..=50).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test]
async fn test_into_stream_error_is_last_item() -> anyhow::Result<()> {
    // Arrange
    let mut stream = failing_source(vec![1], RippleError::stream_error("upstream gone")).into_stream();

    // Act & Assert
    assert_eq!(stream.next().await, Some(StreamItem::Value(1)));
    let last = stream.next().await.expect("error item expected");
    assert!(last.is_error());
    assert!(last
        .into_result()
        .is_err_and(|e| e.to_string().contains("upstream gone")));
    assert!(stream.next().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_into_stream_drop_disposes_subscription() -> anyhow::Result<()> {
    // Arrange
    let (source, stats) = endless_source(Duration::from_millis(1));
    let mut stream = source.into_stream();

    // Act
    let first = stream.next().await;
    let subscription = stream.subscription().clone();
    drop(stream);

    // Assert
    assert_eq!(first, Some(StreamItem::Value(0)));
    assert!(subscription.is_disposed());
    assert!(wait_until(DEFAULT_TIMEOUT, || stats.stopped() == 1));
    Ok(())
}

#[tokio::test]
async fn test_into_stream_with_take_completes() -> anyhow::Result<()> {
    // Arrange
    let (source, _stats) = endless_source(Duration::ZERO);

    // Act
    let values: Vec<StreamItem<u64>> = source.take(4).into_stream().collect().await;

    // Assert
    assert_eq!(
        values,
        vec![
            StreamItem::Value(0),
            StreamItem::Value(1),
            StreamItem::Value(2),
            StreamItem::Value(3)
        ]
    );
    Ok(())
}

#[test]
fn test_stream_item_from_result() {
    // Arrange
    let ok: StreamItem<i32> = Ok(5).into();
    let failed: StreamItem<i32> = Err(RippleError::stream_error("x")).into();

    // Act & Assert
    assert_eq!(ok, StreamItem::Value(5));
    assert!(failed.is_error());
    assert_ne!(failed.clone(), failed.clone());
    assert_eq!(ok.into_result().ok(), Some(5));
    assert!(failed.value().is_none());
}
