// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Pairwise combination of two streams by index.

use parking_lot::Mutex;
use ripple_core::callback::catch_callback;
use ripple_core::{CancellationToken, Emitter, Notification, Observable, Sink};
use ripple_error::RippleError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Combine the `i`-th item of `a` with the `i`-th item of `b`.
///
/// Items waiting for their partner are queued per source. The result
/// completes as soon as one side completed and has nothing left queued, so
/// it emits `min(count(a), count(b))` items; the other side is cancelled.
/// An error from either side, or a panic in `combine`, fails the result.
///
/// ```
/// use ripple_core::Observable;
/// use ripple_stream::zip;
/// use std::sync::{Arc, Mutex};
///
/// let letters = Observable::just(vec!["A", "B", "C"]);
/// let numbers = Observable::just(vec![1, 2, 3, 4, 5]);
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// zip(letters, numbers, |l, n| format!("{l}{n}"))
///     .subscribe_fn(move |s| sink.lock().unwrap().push(s));
///
/// assert_eq!(*seen.lock().unwrap(), vec!["A1", "B2", "C3"]);
/// ```
pub fn zip<A, B, R, F>(a: Observable<A>, b: Observable<B>, combine: F) -> Observable<R>
where
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    let combine = Arc::new(combine);
    Observable::from_source(move |downstream: Emitter<R>| {
        let state = Zip::new(Arc::clone(&combine), downstream);
        a.activate(
            state
                .downstream
                .branch(Left(Arc::clone(&state)), state.left_token.clone()),
        );
        b.activate(
            state
                .downstream
                .branch(Right(Arc::clone(&state)), state.right_token.clone()),
        );
    })
}

/// Extension trait providing `zip` and `zip_with`.
pub trait ZipExt<A>: Sized {
    /// Pair items by index into tuples. See [`zip`](crate::zip()).
    fn zip<B>(self, other: Observable<B>) -> Observable<(A, B)>
    where
        B: Send + 'static;

    /// Combine items by index with `combine`. See [`zip`](crate::zip()).
    fn zip_with<B, R, F>(self, other: Observable<B>, combine: F) -> Observable<R>
    where
        B: Send + 'static,
        R: Send + 'static,
        F: Fn(A, B) -> R + Send + Sync + 'static;
}

impl<A: Send + 'static> ZipExt<A> for Observable<A> {
    fn zip<B>(self, other: Observable<B>) -> Observable<(A, B)>
    where
        B: Send + 'static,
    {
        zip(self, other, |a, b| (a, b))
    }

    fn zip_with<B, R, F>(self, other: Observable<B>, combine: F) -> Observable<R>
    where
        B: Send + 'static,
        R: Send + 'static,
        F: Fn(A, B) -> R + Send + Sync + 'static,
    {
        zip(self, other, combine)
    }
}

struct Queues<A, B> {
    left: VecDeque<A>,
    right: VecDeque<B>,
    left_done: bool,
    right_done: bool,
    terminated: bool,
}

enum Step<A, B> {
    Pair(A, B),
    Complete,
    Idle,
}

impl<A, B> Queues<A, B> {
    fn next_step(&mut self) -> Step<A, B> {
        if self.terminated {
            return Step::Idle;
        }
        if !self.left.is_empty() && !self.right.is_empty() {
            if let (Some(a), Some(b)) = (self.left.pop_front(), self.right.pop_front()) {
                return Step::Pair(a, b);
            }
        }
        if (self.left_done && self.left.is_empty()) || (self.right_done && self.right.is_empty()) {
            self.terminated = true;
            return Step::Complete;
        }
        Step::Idle
    }
}

struct Zip<A, B, R, F> {
    combine: Arc<F>,
    downstream: Emitter<R>,
    left_token: CancellationToken,
    right_token: CancellationToken,
    queues: Mutex<Queues<A, B>>,
    wip: AtomicUsize,
}

impl<A, B, R, F> Zip<A, B, R, F>
where
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    fn new(combine: Arc<F>, downstream: Emitter<R>) -> Arc<Self> {
        let left_token = downstream.token().child_token();
        let right_token = downstream.token().child_token();
        Arc::new(Self {
            combine,
            downstream,
            left_token,
            right_token,
            queues: Mutex::new(Queues {
                left: VecDeque::new(),
                right: VecDeque::new(),
                left_done: false,
                right_done: false,
                terminated: false,
            }),
            wip: AtomicUsize::new(0),
        })
    }

    fn update(&self, change: impl FnOnce(&mut Queues<A, B>)) {
        {
            let mut queues = self.queues.lock();
            if queues.terminated {
                return;
            }
            change(&mut queues);
        }
        self.drain();
    }

    fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        let mut missed = 1;
        loop {
            loop {
                let step = self.queues.lock().next_step();
                match step {
                    Step::Pair(a, b) => match catch_callback(|| (self.combine)(a, b)) {
                        Ok(combined) => self.downstream.forward(Notification::Item(combined)),
                        Err(e) => self.fail(e),
                    },
                    Step::Complete => {
                        self.release_sources();
                        self.downstream.forward(Notification::Completed);
                    }
                    Step::Idle => break,
                }
            }

            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn fail(&self, error: RippleError) {
        {
            let mut queues = self.queues.lock();
            if queues.terminated {
                return;
            }
            queues.terminated = true;
            queues.left.clear();
            queues.right.clear();
        }
        self.release_sources();
        self.downstream.forward(Notification::Failed(error));
    }

    fn release_sources(&self) {
        self.left_token.cancel();
        self.right_token.cancel();
    }
}

struct Left<A, B, R, F>(Arc<Zip<A, B, R, F>>);

impl<A, B, R, F> Sink<A> for Left<A, B, R, F>
where
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    fn on_item(&mut self, item: A) {
        self.0.update(|q| q.left.push_back(item));
    }

    fn on_complete(&mut self) {
        self.0.update(|q| q.left_done = true);
    }

    fn on_error(&mut self, error: RippleError) {
        self.0.fail(error);
    }
}

struct Right<A, B, R, F>(Arc<Zip<A, B, R, F>>);

impl<A, B, R, F> Sink<B> for Right<A, B, R, F>
where
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    fn on_item(&mut self, item: B) {
        self.0.update(|q| q.right.push_back(item));
    }

    fn on_complete(&mut self) {
        self.0.update(|q| q.right_done = true);
    }

    fn on_error(&mut self, error: RippleError) {
        self.0.fail(error);
    }
}
