//! # Shim Configuration
//!
//! Gas budget and precompile set shared by the pipe and foreign-call shims.
//!
//! Resolution order: defaults, optional JSON file, environment, then whatever
//! the binary layers on top (CLI flags).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::ConfigError;

/// Default gas budget handed to every precompile call.
pub const DEFAULT_GAS_BUDGET: u64 = 10_000_000;

/// Environment variable overriding the gas budget.
pub const ENV_GAS_BUDGET: &str = "PRECOMPILE_SHIM_GAS_BUDGET";

/// Environment variable overriding the fork.
pub const ENV_FORK: &str = "PRECOMPILE_SHIM_FORK";

/// Hard fork whose precompile set is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fork {
    /// 0x01-0x04.
    Homestead,
    /// Adds modexp and the alt_bn128 contracts.
    Byzantium,
    /// Repriced alt_bn128 and blake2f.
    #[default]
    Istanbul,
    /// EIP-2565 modexp pricing.
    Berlin,
    /// Point evaluation, when the precompile library has a KZG backend.
    Cancun,
}

impl Fork {
    /// Every supported fork, oldest first.
    pub const ALL: [Fork; 5] = [
        Fork::Homestead,
        Fork::Byzantium,
        Fork::Istanbul,
        Fork::Berlin,
        Fork::Cancun,
    ];

    /// Lowercase name as used in config files and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Fork::Homestead => "homestead",
            Fork::Byzantium => "byzantium",
            Fork::Istanbul => "istanbul",
            Fork::Berlin => "berlin",
            Fork::Cancun => "cancun",
        }
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Fork {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Fork::ALL
            .into_iter()
            .find(|fork| fork.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownFork(s.to_string()))
    }
}

/// Complete shim configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShimConfig {
    /// Gas budget passed to every precompile call.
    pub gas_budget: u64,
    /// Precompile set to expose.
    pub fork: Fork,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            gas_budget: DEFAULT_GAS_BUDGET,
            fork: Fork::default(),
        }
    }
}

impl ShimConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Defaults or file contents, with environment overrides applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let config = Self::from_json_file(path)?;
                info!("Loaded config from {}", path.display());
                config
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `PRECOMPILE_SHIM_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Values that fail to parse
    /// are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_GAS_BUDGET) {
            match raw.trim().replace('_', "").parse::<u64>() {
                Ok(gas_budget) => self.gas_budget = gas_budget,
                Err(e) => warn!("Ignoring {}={:?}: {}", ENV_GAS_BUDGET, raw, e),
            }
        }
        if let Some(raw) = lookup(ENV_FORK) {
            match raw.parse::<Fork>() {
                Ok(fork) => self.fork = fork,
                Err(e) => warn!("Ignoring {}: {}", ENV_FORK, e),
            }
        }
    }

    /// Reject settings that would make every call fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gas_budget == 0 {
            return Err(ConfigError::ZeroGasBudget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ShimConfig::default();
        assert_eq!(config.gas_budget, 10_000_000);
        assert_eq!(config.fork, Fork::Istanbul);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fork_from_str() {
        assert_eq!("berlin".parse::<Fork>().unwrap(), Fork::Berlin);
        assert_eq!(" Cancun ".parse::<Fork>().unwrap(), Fork::Cancun);
        assert!(matches!(
            "london".parse::<Fork>(),
            Err(ConfigError::UnknownFork(_))
        ));
    }

    #[test]
    fn test_json_partial_document() {
        let config = ShimConfig::from_json_str(r#"{ "gas_budget": 1000000 }"#).unwrap();
        assert_eq!(config.gas_budget, 1_000_000);
        assert_eq!(config.fork, Fork::Istanbul);
    }

    #[test]
    fn test_json_rejects_unknown_fields() {
        let result = ShimConfig::from_json_str(r#"{ "gas": 1 }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = ShimConfig::default();
        config.apply_overrides(lookup(&[
            (ENV_GAS_BUDGET, "1_000_000"),
            (ENV_FORK, "byzantium"),
        ]));
        assert_eq!(config.gas_budget, 1_000_000);
        assert_eq!(config.fork, Fork::Byzantium);
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let mut config = ShimConfig::default();
        config.apply_overrides(lookup(&[(ENV_GAS_BUDGET, "lots"), (ENV_FORK, "paris")]));
        assert_eq!(config, ShimConfig::default());
    }

    #[test]
    fn test_zero_gas_budget_rejected() {
        let config = ShimConfig {
            gas_budget: 0,
            ..ShimConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroGasBudget)));
    }

    #[test]
    fn test_missing_file() {
        let result = ShimConfig::from_json_file(Path::new("/nonexistent/shim.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
