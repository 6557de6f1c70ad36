// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Ways to consume a Ripple [`Observable`](ripple_core::Observable) outside of
//! a [`Sink`](ripple_core::Sink).
//!
//! - [`BlockingExt`] blocks the calling thread until the observable
//!   terminates: handy in tests, CLIs and `main`.
//! - [`IntoStreamExt`] turns an observable into a [`futures::Stream`] of
//!   [`StreamItem`]s for async code.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod blocking;
pub mod into_stream;
pub mod stream_item;

pub use self::blocking::BlockingExt;
pub use self::into_stream::{IntoStreamExt, ObservableStream};
pub use self::stream_item::StreamItem;
