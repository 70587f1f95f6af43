//! # Error Types

use thiserror::Error;

use crate::status;

/// Failures of the foreign-call boundary itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FfiError {
    /// A result did not fit the caller's buffer.
    #[error("result needs {required} bytes, buffer holds {capacity}")]
    Overflow {
        /// Bytes the result needs.
        required: usize,
        /// Bytes the caller declared.
        capacity: usize,
    },

    /// A required pointer was null.
    #[error("null pointer passed for {0}")]
    NullPointer(&'static str),

    /// A length does not fit the 32-bit length field.
    #[error("length {0} does not fit in u32")]
    LengthOverflow(usize),
}

impl FfiError {
    /// Status code returned across the boundary for this error.
    #[must_use]
    pub fn status_code(&self) -> i32 {
        match self {
            Self::Overflow { .. } | Self::LengthOverflow(_) => status::OVERFLOW,
            Self::NullPointer(_) => status::INVALID_ARGUMENT,
        }
    }
}
