// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use ripple_error::RippleError;
use thiserror::Error;

/// Application-level failure used to exercise `UserError` propagation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TestError {
    #[error("boom")]
    Boom,
    #[error("invalid value: {0}")]
    Invalid(i64),
}

impl From<TestError> for RippleError {
    fn from(error: TestError) -> Self {
        RippleError::user_error(error)
    }
}
