// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude module re-exporting every operator trait.
//!
//! ```
//! use ripple_stream::prelude::*;
//! ```
//!
//! # Contents
//!
//! - [`ConcatExt`] - Append another stream
//! - [`DelayExt`] - Shift items in time
//! - [`FilterExt`] - Keep matching items
//! - [`FlatMapExt`] - Map to inner streams and merge or concatenate them
//! - [`MapExt`] - Transform items
//! - [`ObserveOnExt`] - Deliver on a scheduler
//! - [`SubscribeOnExt`] - Activate on a scheduler
//! - [`TakeExt`] - Take the first n items
//! - [`ZipExt`] - Pair items by index
//! - [`concat`] and [`zip`] - Free-function forms

pub use crate::concat::{concat, ConcatExt};
pub use crate::delay::DelayExt;
pub use crate::filter::FilterExt;
pub use crate::flat_map::FlatMapExt;
pub use crate::map::MapExt;
pub use crate::observe_on::ObserveOnExt;
pub use crate::subscribe_on::SubscribeOnExt;
pub use crate::take::TakeExt;
pub use crate::zip::{zip, ZipExt};
