//! # revm Precompile Registry
//!
//! Exposes the `revm-precompile` contract set of a given fork through the
//! `PrecompileRegistry` port. Nothing here computes a hash or a pairing; each
//! entry forwards to the library function.

use std::collections::BTreeMap;

use revm_precompile::{u64_to_address, Bytes, PrecompileErrors, PrecompileSpecId, Precompiles};
use tracing::debug;

use crate::config::Fork;
use crate::domain::PrecompileOutput;
use crate::errors::DispatchError;
use crate::ports::{Precompile, PrecompileRegistry};

fn spec_id(fork: Fork) -> PrecompileSpecId {
    match fork {
        Fork::Homestead => PrecompileSpecId::HOMESTEAD,
        Fork::Byzantium => PrecompileSpecId::BYZANTIUM,
        Fork::Istanbul => PrecompileSpecId::ISTANBUL,
        Fork::Berlin => PrecompileSpecId::BERLIN,
        Fork::Cancun => PrecompileSpecId::CANCUN,
    }
}

/// One library precompile bound to its short address.
pub struct RevmPrecompile {
    address: u8,
    inner: &'static revm_precompile::Precompile,
}

impl RevmPrecompile {
    /// Short address of this contract.
    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }
}

impl Precompile for RevmPrecompile {
    fn execute(&self, input: &[u8], gas_limit: u64) -> Result<PrecompileOutput, DispatchError> {
        // Only plain functions are reachable at single-byte addresses; the
        // environment-bound and stateful kinds need an EVM context we do not have.
        let revm_precompile::Precompile::Standard(run) = self.inner else {
            return Err(DispatchError::Execution(format!(
                "precompile 0x{:02x} requires an execution environment",
                self.address
            )));
        };

        let input = Bytes::copy_from_slice(input);
        match run(&input, gas_limit) {
            Ok(output) => Ok(PrecompileOutput {
                gas_used: output.gas_used,
                output: output.bytes.to_vec(),
            }),
            Err(PrecompileErrors::Error(err)) => Err(DispatchError::Execution(err.to_string())),
            Err(PrecompileErrors::Fatal { msg }) => Err(DispatchError::Execution(msg)),
        }
    }
}

/// Registry over the `revm-precompile` set for one fork.
pub struct RevmRegistry {
    fork: Fork,
    entries: BTreeMap<u8, RevmPrecompile>,
}

impl RevmRegistry {
    /// Build the registry for `fork`.
    ///
    /// The library tables are process-wide statics; this only indexes them
    /// by their last address byte.
    #[must_use]
    pub fn new(fork: Fork) -> Self {
        let precompiles = Precompiles::new(spec_id(fork));
        let entries: BTreeMap<u8, RevmPrecompile> = (1..=u8::MAX)
            .filter_map(|address| {
                precompiles
                    .get(&u64_to_address(u64::from(address)))
                    .map(|inner| (address, RevmPrecompile { address, inner }))
            })
            .collect();

        debug!(
            "Indexed {} precompiles for fork {}: {:02x?}",
            entries.len(),
            fork,
            entries.keys().collect::<Vec<_>>()
        );

        Self { fork, entries }
    }

    /// Fork this registry was built for.
    #[must_use]
    pub fn fork(&self) -> Fork {
        self.fork
    }

    /// Number of registered precompiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the fork has no precompiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RevmRegistry {
    fn default() -> Self {
        Self::new(Fork::default())
    }
}

impl PrecompileRegistry for RevmRegistry {
    fn get(&self, address: u8) -> Option<&dyn Precompile> {
        self.entries.get(&address).map(|p| p as &dyn Precompile)
    }

    fn addresses(&self) -> Vec<u8> {
        self.entries.keys().copied().collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
