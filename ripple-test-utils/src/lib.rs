// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the Ripple reactive stream engine.
//!
//! Designed for development and testing only, not for production code.
//!
//! # Key Types
//!
//! - [`Recorder`] / [`RecordingSink`]: a sink that records every signal, checks
//!   the delivery protocol (no overlapping calls, nothing after a terminal
//!   signal) and can play a consumer role: dispose after `n` items, request
//!   demand, simulate slow processing.
//! - [`sources`]: canned producers (synchronous counters, threaded counters,
//!   endless producers, failing producers, randomly delayed producers).
//! - [`TestError`]: a small error type for user-failure scenarios.
//!
//! ```rust
//! use ripple_core::Observable;
//! use ripple_test_utils::Recorder;
//!
//! let recorder = Recorder::new();
//! Observable::just(vec![1, 2, 3]).subscribe(recorder.sink());
//!
//! assert_eq!(recorder.items(), vec![1, 2, 3]);
//! assert!(recorder.is_completed());
//! ```

pub mod helpers;
pub mod recorder;
pub mod sources;
pub mod test_error;

pub use self::helpers::{assert_no_event_within, wait_until, DEFAULT_TIMEOUT};
pub use self::recorder::{Recorder, RecordingSink};
pub use self::test_error::TestError;
