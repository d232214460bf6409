//! Semantic validation of evaluation settings.

use ib_common::{Error, Result};
use ib_math::MAX_NODES;

use crate::EvalConfig;

/// Reject settings that would make every evaluation fail.
pub fn validate_eval_config(config: &EvalConfig) -> Result<()> {
    if config.quadrature_nodes == 0 {
        return Err(Error::Config(
            "quadrature_nodes must be at least 1".to_string(),
        ));
    }
    if config.quadrature_nodes > MAX_NODES {
        return Err(Error::Config(format!(
            "quadrature_nodes must be at most {MAX_NODES}"
        )));
    }
    if config.mc_samples == 0 {
        return Err(Error::Config("mc_samples must be at least 1".to_string()));
    }
    if config.mc_chunk_size == 0 {
        return Err(Error::Config(
            "mc_chunk_size must be at least 1".to_string(),
        ));
    }
    Ok(())
}
