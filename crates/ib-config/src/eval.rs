//! Evaluation settings shared by quadrature and Monte Carlo routines.

use ib_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Env var overriding [`EvalConfig::quadrature_nodes`].
pub const ENV_QUAD_NODES: &str = "IB_QUAD_NODES";
/// Env var overriding [`EvalConfig::mc_samples`].
pub const ENV_MC_SAMPLES: &str = "IB_MC_SAMPLES";
/// Env var overriding [`EvalConfig::seed`].
pub const ENV_SEED: &str = "IB_SEED";

/// Settings for expectation evaluation.
///
/// ```toml
/// quadrature_nodes = 20
/// mc_samples = 1000
/// mc_chunk_size = 65536
/// seed = 0
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Gauss-Hermite node count for Normal-family expectations.
    pub quadrature_nodes: usize,
    /// Default Monte Carlo sample count.
    pub mc_samples: usize,
    /// Samples drawn per Monte Carlo chunk; bounds peak memory.
    pub mc_chunk_size: usize,
    /// RNG seed for Monte Carlo. None draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            quadrature_nodes: ib_math::DEFAULT_NODES,
            mc_samples: 1000,
            mc_chunk_size: 65_536,
            seed: None,
        }
    }
}

impl EvalConfig {
    /// Parse from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `IB_QUAD_NODES`, `IB_MC_SAMPLES` and `IB_SEED` from the process env.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_QUAD_NODES) {
            self.quadrature_nodes = parse_env(ENV_QUAD_NODES, &val)?;
        }
        if let Some(val) = lookup(ENV_MC_SAMPLES) {
            self.mc_samples = parse_env(ENV_MC_SAMPLES, &val)?;
        }
        if let Some(val) = lookup(ENV_SEED) {
            self.seed = Some(parse_env(ENV_SEED, &val)?);
        }
        Ok(())
    }

    /// Set the quadrature node count.
    pub fn with_quadrature_nodes(mut self, n: usize) -> Self {
        self.quadrature_nodes = n;
        self
    }

    /// Set the Monte Carlo sample count.
    pub fn with_mc_samples(mut self, n: usize) -> Self {
        self.mc_samples = n;
        self
    }

    /// Set the Monte Carlo chunk size.
    pub fn with_mc_chunk_size(mut self, n: usize) -> Self {
        self.mc_chunk_size = n;
        self
    }

    /// Fix the Monte Carlo seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, val: &str) -> Result<T> {
    val.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key}={val:?} is not a valid non-negative integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.quadrature_nodes, 20);
        assert_eq!(config.mc_samples, 1000);
        assert_eq!(config.mc_chunk_size, 65_536);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EvalConfig::from_toml_str("quadrature_nodes = 32\nseed = 7\n").unwrap();
        assert_eq!(config.quadrature_nodes, 32);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.mc_samples, 1000);
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = EvalConfig::from_toml_str("nodes = 3\n").unwrap_err();
        assert_eq!(err.code(), 62);
    }

    #[test]
    fn overrides_from_lookup() {
        let env: HashMap<&str, &str> =
            [(ENV_QUAD_NODES, "40"), (ENV_SEED, " 11 ")].into_iter().collect();
        let mut config = EvalConfig::default();
        config
            .apply_overrides_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.quadrature_nodes, 40);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.mc_samples, 1000);
    }

    #[test]
    fn bad_override_is_config_error() {
        let mut config = EvalConfig::default();
        let err = config
            .apply_overrides_from(|key| (key == ENV_MC_SAMPLES).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(ENV_MC_SAMPLES));
    }

    #[test]
    fn builder() {
        let config = EvalConfig::default()
            .with_quadrature_nodes(8)
            .with_mc_samples(10)
            .with_mc_chunk_size(4)
            .with_seed(3);
        assert_eq!(config.quadrature_nodes, 8);
        assert_eq!(config.mc_samples, 10);
        assert_eq!(config.mc_chunk_size, 4);
        assert_eq!(config.seed, Some(3));
    }
}
