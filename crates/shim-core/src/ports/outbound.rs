//! # Driven Ports (SPI - Outbound)
//!
//! The precompile registry the dispatcher depends on. The registry is
//! read-only after construction and is looked up by exact address match.

use crate::domain::PrecompileOutput;
use crate::errors::DispatchError;

/// Trait for precompiled contracts.
pub trait Precompile: Send + Sync {
    /// Execute the precompile with given input.
    ///
    /// # Arguments
    ///
    /// * `input` - Input data
    /// * `gas_limit` - Maximum gas available
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Execution` carrying the library's message when
    /// the input is malformed or the gas limit is too low.
    fn execute(&self, input: &[u8], gas_limit: u64) -> Result<PrecompileOutput, DispatchError>;
}

/// Read-only lookup from a 1-byte address to a precompile.
///
/// Implementations must be safe to share across threads: the foreign-call
/// adapter may be entered from several host threads at once.
pub trait PrecompileRegistry: Send + Sync {
    /// Look up a precompile by address.
    fn get(&self, address: u8) -> Option<&dyn Precompile>;

    /// All registered addresses in ascending order.
    fn addresses(&self) -> Vec<u8>;

    /// Returns true if `address` has an entry.
    fn contains(&self, address: u8) -> bool {
        self.get(address).is_some()
    }
}

impl<T: PrecompileRegistry + ?Sized> PrecompileRegistry for &T {
    fn get(&self, address: u8) -> Option<&dyn Precompile> {
        (**self).get(address)
    }

    fn addresses(&self) -> Vec<u8> {
        (**self).addresses()
    }
}
