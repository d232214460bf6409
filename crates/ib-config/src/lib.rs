//! Infrabayes configuration loading and validation.
//!
//! This crate provides:
//! - The typed [`EvalConfig`] used by the evaluation engine
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod eval;
pub mod resolve;
pub mod validate;

pub use eval::EvalConfig;
pub use resolve::{load_config, resolve_config_path, ConfigSource};
pub use validate::validate_eval_config;
