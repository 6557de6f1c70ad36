// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core contracts of the Ripple reactive stream engine.
//!
//! A cold [`Observable`] runs its [`Source`] once per subscription. The source
//! pushes through an [`Emitter`], which serializes signals into the subscriber's
//! [`Sink`] and stops delivering once the [`Subscription`] is disposed.
//! Subscribers opt in to pull mode with [`SubscribeOptions::backpressure`]: items
//! then flow only as fast as [`Subscription::request`] authorizes, and a
//! [`BackpressureBuffer`] absorbs the difference according to its
//! [`OverflowPolicy`].

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod backpressure_buffer;
pub mod buffered_delivery;
pub mod callback;
pub mod cancellation_token;
pub mod demand;
pub mod emitter;
pub mod notification;
pub mod observable;
pub mod options;
pub mod scheduler;
pub mod sink;
pub mod subscription;

pub use self::backpressure_buffer::{
    BackpressureBuffer, Offer, OverflowPolicy, DEFAULT_BUFFER_CAPACITY,
};
pub use self::buffered_delivery::BufferedDelivery;
pub use self::cancellation_token::CancellationToken;
pub use self::demand::{Demand, UNBOUNDED};
pub use self::emitter::Emitter;
pub use self::notification::Notification;
pub use self::observable::{Observable, Source};
pub use self::options::{BackpressureConfig, SubscribeOptions};
pub use self::scheduler::{Job, Scheduler, Worker};
pub use self::sink::{FnSink, Sink};
pub use self::subscription::{DeliveryControl, Subscription};
pub use ripple_error::{IntoRippleError, Result, ResultExt, RippleError};
