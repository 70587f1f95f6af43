//! # Backends
//!
//! Anything that can answer a precompile call: a spawned shim, an in-process
//! dispatcher, or an independent reference computation used as a control.

use sha2::{Digest, Sha256};
use shim_core::ports::PrecompileDispatch;

use crate::caller::Caller;
use crate::errors::{CommunicationError, CommunicationResult};

/// Short address of SHA-256.
pub const SHA256_ADDRESS: u8 = 0x02;
/// Short address of IDENTITY.
pub const IDENTITY_ADDRESS: u8 = 0x04;

/// A precompile implementation under comparison.
pub trait Backend {
    /// Label used in reports.
    fn name(&self) -> String;

    /// Returns true if this backend can answer calls for `address`.
    fn supports(&self, _address: u8) -> bool {
        true
    }

    /// Run one call. Precompile failures are `CommunicationError::Remote`;
    /// anything else means the backend itself broke.
    fn run(&mut self, address: u8, input: &[u8]) -> CommunicationResult<Vec<u8>>;
}

impl Backend for Caller {
    fn name(&self) -> String {
        self.command().display().to_string()
    }

    fn run(&mut self, address: u8, input: &[u8]) -> CommunicationResult<Vec<u8>> {
        self.run_precompile(address, input)
    }
}

/// A dispatcher running inside this process.
pub struct InProcess<D> {
    dispatcher: D,
}

impl<D: PrecompileDispatch> InProcess<D> {
    /// Wrap `dispatcher`.
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }
}

impl<D: PrecompileDispatch> Backend for InProcess<D> {
    fn name(&self) -> String {
        format!("in-process (gas budget {})", self.dispatcher.gas_budget())
    }

    fn run(&mut self, address: u8, input: &[u8]) -> CommunicationResult<Vec<u8>> {
        self.dispatcher
            .dispatch(address, input)
            .map(|out| out.output)
            .map_err(|e| CommunicationError::Remote(e.to_string()))
    }
}

/// Independent SHA-256 for address 0x02.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Control;

impl Backend for Sha256Control {
    fn name(&self) -> String {
        "reference sha256".to_string()
    }

    fn supports(&self, address: u8) -> bool {
        address == SHA256_ADDRESS
    }

    fn run(&mut self, _address: u8, input: &[u8]) -> CommunicationResult<Vec<u8>> {
        Ok(Sha256::digest(input).to_vec())
    }
}

/// Identity for address 0x04.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityControl;

impl Backend for IdentityControl {
    fn name(&self) -> String {
        "reference identity".to_string()
    }

    fn supports(&self, address: u8) -> bool {
        address == IDENTITY_ADDRESS
    }

    fn run(&mut self, _address: u8, input: &[u8]) -> CommunicationResult<Vec<u8>> {
        Ok(input.to_vec())
    }
}

/// Reference control for `address`, if one exists.
#[must_use]
pub fn reference_control(address: u8) -> Option<Box<dyn Backend>> {
    match address {
        SHA256_ADDRESS => Some(Box::new(Sha256Control)),
        IDENTITY_ADDRESS => Some(Box::new(IdentityControl)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shim_core::prelude::*;

    #[test]
    fn test_in_process_matches_reference_sha256() {
        let mut in_process = InProcess::new(Dispatcher::from_config(&ShimConfig::default()));
        let mut control = Sha256Control;
        let input = b"precompile";
        assert_eq!(
            in_process.run(SHA256_ADDRESS, input).unwrap(),
            control.run(SHA256_ADDRESS, input).unwrap()
        );
    }

    #[test]
    fn test_in_process_unknown_is_remote_error() {
        let mut in_process = InProcess::new(Dispatcher::from_config(&ShimConfig::default()));
        let err = in_process.run(0xff, &[]).unwrap_err();
        assert_eq!(err.remote_message(), Some("precompile 0xff does not exist"));
    }

    #[test]
    fn test_reference_controls() {
        assert!(reference_control(SHA256_ADDRESS).unwrap().supports(SHA256_ADDRESS));
        assert!(reference_control(IDENTITY_ADDRESS).unwrap().supports(IDENTITY_ADDRESS));
        assert!(reference_control(0x05).is_none());
        assert!(!IdentityControl.supports(SHA256_ADDRESS));
    }
}
