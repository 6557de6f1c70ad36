// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Ripple
//!
//! An in-process reactive stream engine: cold observables, composable
//! operators, cooperative cancellation, demand-driven backpressure and
//! pluggable schedulers.
//!
//! ## Overview
//!
//! - An [`Observable`] runs its source once per subscription and pushes
//!   through an [`Emitter`] into a [`Sink`]; signals reach a sink one at a
//!   time, and nothing follows `on_complete`/`on_error`.
//! - Every subscription returns a [`Subscription`]. `dispose()` cancels the
//!   whole chain of stages up to the producer.
//! - Consumers opt in to pull mode through [`SubscribeOptions::backpressure`]
//!   and then drive the flow with [`Subscription::request`]. A bounded
//!   [`BackpressureBuffer`] absorbs bursts according to its
//!   [`OverflowPolicy`].
//! - Operators (`map`, `flat_map`, `concat_map`, `zip`, `concat`, ...) are
//!   extension traits collected in [`prelude`].
//! - Where work runs is chosen with `subscribe_on`/`observe_on` and the
//!   schedulers in [`scheduler`].
//!
//! ## Quick Start
//!
//! ```rust
//! use ripple::prelude::*;
//!
//! let letters = Observable::just(vec!["A", "B", "C"]);
//! let numbers = Observable::from_iterable(1..=5);
//!
//! let zipped = zip(letters, numbers, |l, n| format!("{l}{n}"))
//!     .blocking_collect()
//!     .unwrap();
//!
//! assert_eq!(zipped, vec!["A1", "B2", "C3"]);
//! ```
//!
//! ## Backpressure
//!
//! ```rust
//! use ripple::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! let options = SubscribeOptions::new()
//!     .backpressure(BackpressureConfig::new(16, OverflowPolicy::Fail).unwrap());
//!
//! let subscription = Observable::from_iterable(1..=10)
//!     .subscribe_with(FnSink::new(move |x| sink.lock().unwrap().push(x)), options);
//!
//! assert!(seen.lock().unwrap().is_empty());
//! subscription.request(3).unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
//! ```

// Re-export core types
pub use ripple_core::{
    BackpressureBuffer, BackpressureConfig, CancellationToken, Emitter, FnSink, Notification,
    Observable, OverflowPolicy, Sink, Source, SubscribeOptions, Subscription,
    DEFAULT_BUFFER_CAPACITY,
};
pub use ripple_error::{Result, RippleError};

pub use ripple_exec::{ObservableStream, StreamItem};
pub use ripple_stream::{concat, zip};

/// Schedulers and their traits.
pub mod scheduler {
    pub use ripple_core::{Job, Scheduler, Worker};
    pub use ripple_scheduler::{
        computation, new_thread, trampoline, NewThreadScheduler, ThreadPoolConfig,
        ThreadPoolScheduler, TrampolineScheduler,
    };
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use ripple_core::{
        BackpressureConfig, FnSink, Observable, OverflowPolicy, Sink, SubscribeOptions,
        Subscription,
    };
    pub use ripple_error::{Result, RippleError};
    pub use ripple_exec::{BlockingExt, IntoStreamExt, StreamItem};
    pub use ripple_stream::prelude::*;
}
