//! # Dispatch Entities

use crate::errors::DispatchError;

/// Precompile execution result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecompileOutput {
    /// Gas used by the precompile.
    pub gas_used: u64,
    /// Output data.
    pub output: Vec<u8>,
}

impl PrecompileOutput {
    /// Create an output record.
    pub fn new(gas_used: u64, output: impl Into<Vec<u8>>) -> Self {
        Self {
            gas_used,
            output: output.into(),
        }
    }
}

/// Outcome of dispatching one request: the output, or a failure that is
/// reported to the caller.
pub type DispatchResult = Result<PrecompileOutput, DispatchError>;
