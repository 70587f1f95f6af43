//! # Driving Port (API - Inbound)
//!
//! What the transports (pipe server, foreign-call adapter, in-process
//! callers) use to run a precompile.

use crate::domain::DispatchResult;

/// Run one precompile call under a fixed gas budget.
pub trait PrecompileDispatch {
    /// Gas budget passed to every precompile.
    fn gas_budget(&self) -> u64;

    /// Look up `address` and execute it on `input`.
    ///
    /// Unknown addresses and execution failures come back as `Err`; neither
    /// is fatal to the caller.
    fn dispatch(&self, address: u8, input: &[u8]) -> DispatchResult;
}

impl<T: PrecompileDispatch + ?Sized> PrecompileDispatch for &T {
    fn gas_budget(&self) -> u64 {
        (**self).gas_budget()
    }

    fn dispatch(&self, address: u8, input: &[u8]) -> DispatchResult {
        (**self).dispatch(address, input)
    }
}
