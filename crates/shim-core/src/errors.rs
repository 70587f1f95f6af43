//! # Error Types
//!
//! All error types for framing, dispatch and configuration.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// WIRE ERRORS
// =============================================================================

/// Errors raised while reading or writing frames on a byte stream.
#[derive(Debug, Error)]
pub enum WireError {
    /// The underlying stream reported an error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended cleanly on a frame boundary.
    #[error("stream closed")]
    Closed,

    /// The stream ended in the middle of a frame.
    #[error("stream ended mid-frame: expected {expected} bytes, received {received}")]
    Truncated {
        /// Bytes the frame needed.
        expected: usize,
        /// Bytes read before the stream ended.
        received: usize,
    },

    /// Body does not fit the 16-bit length field.
    #[error("frame body too large: {len} > {max} bytes")]
    BodyTooLarge {
        /// Body length in bytes.
        len: usize,
        /// Largest encodable body.
        max: usize,
    },

    /// Response status byte was neither 0 nor 1.
    #[error("invalid status byte: 0x{0:02x}")]
    InvalidStatus(u8),
}

impl WireError {
    /// Returns true if this error means the peer stopped sending frames.
    ///
    /// Read-side failures of any kind end the request loop without a reply.
    #[must_use]
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Self::Closed | Self::Truncated { .. } | Self::Io(_))
    }
}

/// Result alias for framing operations.
pub type WireResult<T> = Result<T, WireError>;

// =============================================================================
// DISPATCH ERRORS
// =============================================================================

/// Protocol-level failures. All of them are reported to the peer and the
/// request loop continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No registry entry for the requested address.
    #[error("precompile 0x{0:02x} does not exist")]
    UnknownPrecompile(u8),

    /// The precompile rejected its input or ran out of gas.
    #[error("{0}")]
    Execution(String),

    /// The precompile produced more bytes than a response frame can carry.
    #[error("precompile output of {len} bytes exceeds frame limit of {max} bytes")]
    OutputTooLarge {
        /// Output length in bytes.
        len: usize,
        /// Largest body a response frame carries.
        max: usize,
    },
}

impl DispatchError {
    /// Returns true if the address was not found in the registry.
    #[must_use]
    pub fn is_unknown_precompile(&self) -> bool {
        matches!(self, Self::UnknownPrecompile(_))
    }
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A zero gas budget would make every precompile fail.
    #[error("gas budget must be non-zero")]
    ZeroGasBudget,

    /// Fork name not recognised.
    #[error("unknown fork '{0}' (expected one of homestead, byzantium, istanbul, berlin, cancun)")]
    UnknownFork(String),

    /// Config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for `ShimConfig`.
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// TESTS
// =============================================================================
