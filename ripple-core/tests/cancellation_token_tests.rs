// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_core::CancellationToken;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// ============================================================================
// Flag
// ============================================================================

#[test]
fn test_new_token_not_cancelled() {
    // Act & Assert
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn test_cancel_is_idempotent() {
    // Act & Assert
    let token = CancellationToken::new();
    token.cancel();
    token.cancel();
    token.cancel();
    assert!(token.is_cancelled());
}

#[test]
fn test_clone_shares_state() {
    // Arrange
    let token = CancellationToken::new();
    let clone = token.clone();

    // Act
    clone.cancel();

    // Assert
    assert!(token.is_cancelled());
}

#[test]
fn test_cancel_visible_across_threads() {
    // Arrange
    let token = CancellationToken::new();
    let remote = token.clone();

    // Act
    thread::spawn(move || remote.cancel())
        .join()
        .expect("cancelling thread panicked");

    // Assert
    assert!(token.is_cancelled());
}

// ============================================================================
// Tree
// ============================================================================

#[test]
fn test_cancelling_parent_cancels_children() {
    // Arrange
    let parent = CancellationToken::new();
    let child = parent.child_token();
    let grandchild = child.child_token();

    // Act
    parent.cancel();

    // Assert
    assert!(child.is_cancelled());
    assert!(grandchild.is_cancelled());
}

#[test]
fn test_cancelling_child_leaves_parent_alone() {
    // Arrange
    let parent = CancellationToken::new();
    let child = parent.child_token();

    // Act
    child.cancel();

    // Assert
    assert!(child.is_cancelled());
    assert!(!parent.is_cancelled());
}

#[test]
fn test_child_of_cancelled_parent_starts_cancelled() {
    // Arrange
    let parent = CancellationToken::new();
    parent.cancel();

    // Act & Assert
    assert!(parent.child_token().is_cancelled());
}

// ============================================================================
// Callbacks and waits
// ============================================================================

#[test]
fn test_on_cancel_runs_once() {
    // Arrange
    let token = CancellationToken::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    token.on_cancel(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // Act
    token.cancel();
    token.cancel();

    // Assert
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_on_cancel_after_cancel_runs_immediately() {
    // Arrange
    let token = CancellationToken::new();
    token.cancel();

    // Act
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    token.on_cancel(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // Assert
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_wait_timeout_expires_without_cancel() {
    // Act & Assert
    let token = CancellationToken::new();
    assert!(!token.wait_timeout(Duration::from_millis(20)));
}

#[test]
fn test_wait_returns_after_cancel_from_other_thread() {
    // Arrange
    let token = CancellationToken::new();
    let remote = token.clone();

    // Act
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        remote.cancel();
    });

    // Assert
    assert!(token.wait_timeout(Duration::from_secs(5)));
    handle.join().expect("cancelling thread panicked");
}

#[tokio::test]
async fn test_cancelled_future_resolves_after_cancel() {
    // Arrange
    let token = CancellationToken::new();
    let remote = token.clone();

    // Act
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        remote.cancel();
    });

    // Assert
    tokio::time::timeout(Duration::from_secs(5), token.cancelled())
        .await
        .expect("token was not cancelled in time");
}

#[test]
fn test_cancelled_future_ready_when_already_cancelled() {
    // Arrange
    let token = CancellationToken::new();
    token.cancel();

    // Act & Assert
    futures::executor::block_on(token.cancelled());
}
