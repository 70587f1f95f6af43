//! # In-Memory Registry
//!
//! A registry backed by closures. Used as a test double and for hosts that
//! want to expose their own contracts through the same framing.

use std::collections::BTreeMap;

use crate::domain::PrecompileOutput;
use crate::errors::DispatchError;
use crate::ports::{Precompile, PrecompileRegistry};

type PrecompileFn = dyn Fn(&[u8], u64) -> Result<PrecompileOutput, DispatchError> + Send + Sync;

/// A precompile implemented by a closure.
pub struct FnPrecompile(Box<PrecompileFn>);

impl Precompile for FnPrecompile {
    fn execute(&self, input: &[u8], gas_limit: u64) -> Result<PrecompileOutput, DispatchError> {
        (self.0)(input, gas_limit)
    }
}

/// Closure-backed registry.
#[derive(Default)]
pub struct InMemoryRegistry {
    entries: BTreeMap<u8, FnPrecompile>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `run` at `address`, replacing any previous entry.
    pub fn insert<F>(&mut self, address: u8, run: F)
    where
        F: Fn(&[u8], u64) -> Result<PrecompileOutput, DispatchError> + Send + Sync + 'static,
    {
        self.entries.insert(address, FnPrecompile(Box::new(run)));
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with<F>(mut self, address: u8, run: F) -> Self
    where
        F: Fn(&[u8], u64) -> Result<PrecompileOutput, DispatchError> + Send + Sync + 'static,
    {
        self.insert(address, run);
        self
    }
}

impl PrecompileRegistry for InMemoryRegistry {
    fn get(&self, address: u8) -> Option<&dyn Precompile> {
        self.entries.get(&address).map(|p| p as &dyn Precompile)
    }

    fn addresses(&self) -> Vec<u8> {
        self.entries.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_exact_address() {
        let registry = InMemoryRegistry::new()
            .with(0x04, |input, _| Ok(PrecompileOutput::new(0, input)));

        assert!(registry.contains(0x04));
        assert!(!registry.contains(0x05));
        assert_eq!(registry.addresses(), vec![0x04]);

        let out = registry.get(0x04).unwrap().execute(b"abc", 100).unwrap();
        assert_eq!(out.output, b"abc");
    }

    #[test]
    fn test_gas_limit_forwarded() {
        let registry = InMemoryRegistry::new().with(0x01, |_, gas| {
            Ok(PrecompileOutput::new(gas, gas.to_be_bytes()))
        });
        let out = registry.get(0x01).unwrap().execute(&[], 42).unwrap();
        assert_eq!(out.gas_used, 42);
    }
}
