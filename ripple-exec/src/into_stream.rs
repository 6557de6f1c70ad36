// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bridge from an [`Observable`] to a [`futures::Stream`].

use crate::logging::trace;
use crate::StreamItem;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::stream::{FusedStream, Stream, StreamExt};
use ripple_core::{Observable, Sink, Subscription};
use ripple_error::RippleError;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Extension trait providing `into_stream`.
pub trait IntoStreamExt<T>: Sized {
    /// Subscribe and expose the signals as a [`Stream`] of [`StreamItem`]s.
    ///
    /// Items are buffered without bound until polled. An error is yielded as
    /// [`StreamItem::Error`] and ends the stream; completion just ends it.
    /// Dropping the stream disposes the subscription.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::StreamExt;
    /// use ripple_core::Observable;
    /// use ripple_exec::{IntoStreamExt, StreamItem};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let mut stream = Observable::just(vec![1, 2]).into_stream();
    ///
    /// assert_eq!(stream.next().await, Some(StreamItem::Value(1)));
    /// assert_eq!(stream.next().await, Some(StreamItem::Value(2)));
    /// assert!(stream.next().await.is_none());
    /// # }
    /// ```
    ///
    /// # See Also
    ///
    /// - [`BlockingExt`](crate::BlockingExt) - Consume without an async runtime
    fn into_stream(self) -> ObservableStream<T>;
}

impl<T: Send + 'static> IntoStreamExt<T> for Observable<T> {
    fn into_stream(self) -> ObservableStream<T> {
        let (sender, receiver) = unbounded();
        let subscription = self.subscribe(ChannelSink { sender });
        ObservableStream {
            receiver,
            subscription,
        }
    }
}

/// Stream returned by [`IntoStreamExt::into_stream`].
pub struct ObservableStream<T> {
    receiver: UnboundedReceiver<StreamItem<T>>,
    subscription: Subscription,
}

impl<T> ObservableStream<T> {
    /// Handle of the underlying subscription.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl<T> Stream for ObservableStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl<T> FusedStream for ObservableStream<T> {
    fn is_terminated(&self) -> bool {
        self.receiver.is_terminated()
    }
}

impl<T> Drop for ObservableStream<T> {
    fn drop(&mut self) {
        self.subscription.dispose();
    }
}

impl<T> fmt::Debug for ObservableStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableStream")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

struct ChannelSink<T> {
    sender: UnboundedSender<StreamItem<T>>,
}

impl<T: Send + 'static> Sink<T> for ChannelSink<T> {
    fn on_item(&mut self, item: T) {
        if self.sender.unbounded_send(StreamItem::Value(item)).is_err() {
            trace!("stream receiver dropped, item discarded");
        }
    }

    fn on_complete(&mut self) {
        self.sender.close_channel();
    }

    fn on_error(&mut self, error: RippleError) {
        if self.sender.unbounded_send(StreamItem::Error(error)).is_err() {
            trace!("stream receiver dropped, error discarded");
        }
        self.sender.close_channel();
    }
}
