// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the Ripple reactive stream engine
//!
//! Every failure that can reach a sink's `on_error`, or that the engine returns
//! to calling code, is a [`RippleError`]. The variants fall into three groups:
//!
//! - **callback failures** ([`RippleError::UserError`], [`RippleError::CallbackPanic`]):
//!   raised by user code (mapping functions, producers, combiners) and delivered
//!   downstream exactly once as a terminal signal;
//! - **protocol violations** ([`RippleError::ProtocolViolation`]): the engine's
//!   contract was broken (emission after a terminal signal, `request(0)`); these
//!   are defects and are never retried;
//! - **engine conditions** (overflow under the `Fail` policy, rejected scheduler
//!   work, invalid configuration, timeouts).
//!
//! # Examples
//!
//! ```
//! use ripple_error::{Result, RippleError};
//!
//! fn validate(capacity: usize) -> Result<usize> {
//!     if capacity == 0 {
//!         return Err(RippleError::invalid_configuration("capacity must be positive"));
//!     }
//!     Ok(capacity)
//! }
//!
//! assert!(validate(0).is_err());
//! ```

use std::time::Duration;

/// Root error type for all Ripple operations
#[derive(Debug, thiserror::Error)]
pub enum RippleError {
    /// Custom error from user code
    ///
    /// Wraps errors returned by user-provided functions (fallible mappers,
    /// producers passed to `create`, combiners).
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// User-provided callback panicked
    ///
    /// Panics inside producers and operator callbacks are caught and converted
    /// to this variant so the subscription terminates with `on_error`.
    #[error("User callback panicked: {context}")]
    CallbackPanic {
        /// Panic payload, when it was a string
        context: String,
    },

    /// The sink/source contract was broken
    ///
    /// Raised when an item or a second terminal signal is emitted after the
    /// subscription terminated, or when zero demand is requested.
    #[error("Protocol violation: {context}")]
    ProtocolViolation {
        /// What was attempted
        context: String,
    },

    /// A backpressure buffer configured with the `Fail` policy overflowed
    #[error("Backpressure buffer overflow (capacity: {capacity})")]
    BufferOverflow {
        /// Capacity of the buffer that overflowed
        capacity: usize,
    },

    /// A configuration value was rejected
    #[error("Invalid configuration: {context}")]
    InvalidConfiguration {
        /// Which value was rejected and why
        context: String,
    },

    /// A worker refused work because it was disposed or shut down
    #[error("Scheduler rejected work: {context}")]
    SchedulerRejected {
        /// Name of the worker context
        context: String,
    },

    /// Stream processing encountered an error
    ///
    /// General-purpose variant, also produced when context is attached to a
    /// user error through [`ResultExt`].
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong during stream processing
        context: String,
    },

    /// Timeout occurred while waiting for an operation
    #[error("Operation timed out after {duration:?}: {operation}")]
    Timeout {
        /// The operation that timed out
        operation: String,
        /// How long we waited
        duration: Duration,
    },
}

impl RippleError {
    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Create a callback panic error with the given context
    pub fn callback_panic(context: impl Into<String>) -> Self {
        Self::CallbackPanic {
            context: context.into(),
        }
    }

    /// Create a protocol violation with the given context
    pub fn protocol_violation(context: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            context: context.into(),
        }
    }

    /// Create a buffer overflow error
    #[must_use]
    pub const fn buffer_overflow(capacity: usize) -> Self {
        Self::BufferOverflow { capacity }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(context: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            context: context.into(),
        }
    }

    /// Create a scheduler rejection error
    pub fn scheduler_rejected(context: impl Into<String>) -> Self {
        Self::SchedulerRejected {
            context: context.into(),
        }
    }

    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Check if this error is a broken engine contract
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::ProtocolViolation { .. })
    }

    /// Check if this error was raised by user code
    #[must_use]
    pub const fn is_user_failure(&self) -> bool {
        matches!(self, Self::UserError(_) | Self::CallbackPanic { .. })
    }

    /// Check if this error indicates a permanent failure
    ///
    /// The engine never retries; this classifies which errors a caller-side
    /// retry (re-subscription) cannot fix either.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::ProtocolViolation { .. }
                | Self::InvalidConfiguration { .. }
                | Self::CallbackPanic { .. }
        )
    }
}

/// Specialized Result type for Ripple operations
///
/// ```
/// use ripple_error::Result;
///
/// fn process() -> Result<String> {
///     Ok("processed".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, RippleError>;

/// Extension trait for converting errors into `RippleError`
///
/// Implemented for every `std::error::Error + Send + Sync + 'static`.
pub trait IntoRippleError {
    /// Convert this error into a `RippleError` with additional context
    fn into_ripple_error(self, context: &str) -> RippleError;

    /// Convert this error into a `RippleError` without additional context
    fn into_ripple(self) -> RippleError
    where
        Self: Sized,
    {
        self.into_ripple_error("")
    }
}

impl<E: std::error::Error + Send + Sync + 'static> IntoRippleError for E {
    fn into_ripple_error(self, context: &str) -> RippleError {
        if context.is_empty() {
            RippleError::user_error(self)
        } else {
            RippleError::stream_error(format!("{context}: {self}"))
        }
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(RippleError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(RippleError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<RippleError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| attach_context(context.into(), e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| attach_context(f(), e.into()))
    }
}

fn attach_context(context: String, error: RippleError) -> RippleError {
    match error {
        RippleError::UserError(inner) => RippleError::StreamProcessingError {
            context: format!("{context}: {inner}"),
        },
        other => other,
    }
}

impl Clone for RippleError {
    fn clone(&self) -> Self {
        match self {
            // Boxed user errors cannot be cloned; keep their message
            Self::UserError(e) => Self::StreamProcessingError {
                context: format!("User error: {e}"),
            },
            Self::CallbackPanic { context } => Self::CallbackPanic {
                context: context.clone(),
            },
            Self::ProtocolViolation { context } => Self::ProtocolViolation {
                context: context.clone(),
            },
            Self::BufferOverflow { capacity } => Self::BufferOverflow {
                capacity: *capacity,
            },
            Self::InvalidConfiguration { context } => Self::InvalidConfiguration {
                context: context.clone(),
            },
            Self::SchedulerRejected { context } => Self::SchedulerRejected {
                context: context.clone(),
            },
            Self::StreamProcessingError { context } => Self::StreamProcessingError {
                context: context.clone(),
            },
            Self::Timeout {
                operation,
                duration,
            } => Self::Timeout {
                operation: operation.clone(),
                duration: *duration,
            },
        }
    }
}
