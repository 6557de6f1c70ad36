// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Canned producers.

use ripple_core::{Emitter, Observable, RippleError};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Emits `1..=n` synchronously on the subscribing thread, then completes.
pub fn counting_source(n: u64) -> Observable<u64> {
    Observable::create(move |emitter| {
        for i in 1..=n {
            if emitter.is_cancelled() {
                return Ok(());
            }
            emitter.next(i)?;
        }
        emitter.complete()
    })
}

/// Emits `1..=n` from a dedicated thread, pausing `interval` between items.
pub fn threaded_counter(n: u64, interval: Duration) -> Observable<u64> {
    Observable::from_source(move |emitter: Emitter<u64>| {
        thread::spawn(move || {
            for i in 1..=n {
                if emitter.is_cancelled() || emitter.next(i).is_err() {
                    return;
                }
                if !interval.is_zero() {
                    thread::sleep(interval);
                }
            }
            let _ = emitter.complete();
        });
    })
}

/// Counters observed by [`endless_source`].
#[derive(Debug, Clone, Default)]
pub struct ProducerStats {
    emitted: Arc<AtomicU64>,
    activations: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

impl ProducerStats {
    /// Items emitted across all subscriptions.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::SeqCst)
    }

    /// Number of subscriptions that started the producer.
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    /// Number of producer threads that observed cancellation and exited.
    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Emits `0, 1, 2, ...` from a dedicated thread until cancelled.
pub fn endless_source(interval: Duration) -> (Observable<u64>, ProducerStats) {
    let stats = ProducerStats::default();
    let observed = stats.clone();

    let source = Observable::from_source(move |emitter: Emitter<u64>| {
        let stats = observed.clone();
        stats.activations.fetch_add(1, Ordering::SeqCst);
        thread::spawn(move || {
            let mut next = 0;
            while !emitter.is_cancelled() {
                if emitter.next(next).is_err() {
                    break;
                }
                stats.emitted.fetch_add(1, Ordering::SeqCst);
                next += 1;
                if !interval.is_zero() {
                    thread::sleep(interval);
                }
            }
            stats.stopped.fetch_add(1, Ordering::SeqCst);
        });
    });

    (source, stats)
}

/// Emits `items` synchronously, then fails with `error`.
pub fn failing_source<T>(items: Vec<T>, error: RippleError) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    Observable::create(move |emitter| {
        for item in items.iter().cloned() {
            emitter.next(item)?;
        }
        emitter.error(error.clone())
    })
}

/// Emits `items` from a dedicated thread, sleeping a random duration up to
/// `max_delay` before each one.
pub fn randomly_delayed<T>(items: Vec<T>, max_delay: Duration) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    let max_micros = u64::try_from(max_delay.as_micros()).unwrap_or(u64::MAX);
    Observable::from_source(move |emitter: Emitter<T>| {
        let items = items.clone();
        thread::spawn(move || {
            for item in items {
                thread::sleep(Duration::from_micros(fastrand::u64(0..=max_micros)));
                if emitter.is_cancelled() || emitter.next(item).is_err() {
                    return;
                }
            }
            let _ = emitter.complete();
        });
    })
}
