// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Composable operators for Ripple observables.
//!
//! Every operator is an extension trait implemented for
//! [`Observable`](ripple_core::Observable); import them one by one or all at
//! once through the [`prelude`]. Operators are cold: nothing runs until the
//! resulting observable is subscribed, and every subscription builds its own
//! chain of stages.
//!
//! # Operator Selection Guide
//!
//! | Operator | Output | Order |
//! |----------|--------|-------|
//! | [`map`](MapExt::map) / [`try_map`](MapExt::try_map) | one item per item | kept |
//! | [`filter`](FilterExt::filter) | matching items | kept |
//! | [`take`](TakeExt::take) | first `n` items | kept |
//! | [`flat_map`](FlatMapExt::flat_map) | items of every inner stream | interleaved |
//! | [`concat_map`](FlatMapExt::concat_map) | items of every inner stream | upstream, then inner |
//! | [`zip`](zip()) | `combine(a_i, b_i)` | by index |
//! | [`concat`](concat()) | items of each source in turn | source, then item |
//! | [`delay`](DelayExt::delay) | the same items, later | kept |
//!
//! Scheduling is expressed with [`subscribe_on`](SubscribeOnExt::subscribe_on)
//! (where the source runs) and [`observe_on`](ObserveOnExt::observe_on) (where
//! the consumer runs).
//!
//! # Cancellation
//!
//! Each stage subscribes upstream with a child of its downstream token.
//! Disposing a subscription therefore releases the whole chain, and stages
//! such as `take` or `zip` release their upstream on their own once they are
//! done.
//!
//! # Errors
//!
//! A panic or `Err` in a user callback terminates the stream with a single
//! `on_error` and cancels the upstream. Errors never travel upstream.
//!
//! ```
//! use ripple_core::Observable;
//! use ripple_stream::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! Observable::from_iterable(1..=10)
//!     .filter(|x| x % 3 == 0)
//!     .concat_map(|x| Observable::just(vec![x, -x]))
//!     .take(4)
//!     .subscribe_fn(move |x| sink.lock().unwrap().push(x));
//!
//! assert_eq!(*seen.lock().unwrap(), vec![3, -3, 6, -6]);
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod concat;
pub mod delay;
pub mod filter;
pub mod flat_map;
pub mod map;
pub mod observe_on;
pub mod prelude;
mod stage;
pub mod subscribe_on;
pub mod take;
pub mod zip;

pub use self::concat::{concat, ConcatExt};
pub use self::delay::DelayExt;
pub use self::filter::FilterExt;
pub use self::flat_map::FlatMapExt;
pub use self::map::MapExt;
pub use self::observe_on::ObserveOnExt;
pub use self::subscribe_on::SubscribeOnExt;
pub use self::take::TakeExt;
pub use self::zip::{zip, ZipExt};
