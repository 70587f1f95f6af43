//! # Error Types

use std::fmt;
use std::path::PathBuf;

use shim_core::errors::WireError;
use thiserror::Error;

/// Result of communication with a shim. Transport failure or a remote error
/// string.
pub type CommunicationResult<T> = Result<T, CommunicationError>;

/// Errors talking to a shim or a control.
#[derive(Debug, Error)]
pub enum CommunicationError {
    /// The shim executable could not be started.
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        /// Executable path.
        command: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The child was started without the expected pipe.
    #[error("child process has no {0} pipe")]
    MissingPipe(&'static str),

    /// Pipe failure. Usually the child process exited or panicked.
    #[error("pipe read/write error: {0}")]
    Wire(#[from] WireError),

    /// The shim answered with an error frame.
    #[error("remote call returned error message: {0}")]
    Remote(String),
}

impl CommunicationError {
    /// Returns the remote message if this is a protocol-level error.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Remote(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Disagreement between two backends on the same input.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum ComparisonError {
    /// Both succeeded with different output.
    OkNotEqual(Vec<u8>, Vec<u8>),
    /// Both failed with different messages.
    ErrNotEqual(String, String),
    /// Left failed, right succeeded.
    LeftErr(String, Vec<u8>),
    /// Left succeeded, right failed.
    RightErr(Vec<u8>, String),
}

impl ComparisonError {
    fn parts(&self) -> (&'static str, String, String) {
        let wrap_err = |e: &str| format!("Err:\t{e}");

        match self {
            Self::OkNotEqual(left, right) => ("OkNotEqual", hex::encode(left), hex::encode(right)),
            Self::ErrNotEqual(left, right) => ("ErrNotEqual", wrap_err(left), wrap_err(right)),
            Self::LeftErr(left, right) => ("LeftErr", wrap_err(left), hex::encode(right)),
            Self::RightErr(left, right) => ("RightErr", hex::encode(left), wrap_err(right)),
        }
    }
}

impl fmt::Display for ComparisonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (variant, left, right) = self.parts();
        writeln!(f, "ComparisonError {variant} {{")?;
        writeln!(f, "\tleft:  {left}")?;
        writeln!(f, "\tright: {right}")?;
        write!(f, "}}")
    }
}

impl std::error::Error for ComparisonError {}
