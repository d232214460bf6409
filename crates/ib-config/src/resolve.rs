//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variable → XDG path → defaults.

use std::path::{Path, PathBuf};

use ib_common::{Error, Result};
use tracing::debug;

use crate::{validate_eval_config, EvalConfig};

/// Where the configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Env var naming a config file.
const ENV_CONFIG_PATH: &str = "IB_CONFIG";

const CONFIG_FILENAME: &str = "config.toml";

/// Application name for XDG directories.
const APP_NAME: &str = "infrabayes";

/// Locate the config file.
///
/// An explicit CLI path must exist; a missing one is an error rather than a
/// silent fallback. Env and XDG locations are skipped when absent.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Result<(Option<PathBuf>, ConfigSource)> {
    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok((Some(path.to_path_buf()), ConfigSource::CliArgument));
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok((Some(path), ConfigSource::Environment));
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return Ok((Some(path), ConfigSource::XdgConfig));
        }
    }

    Ok((None, ConfigSource::BuiltinDefault))
}

/// Resolve, read, apply env overrides and validate the evaluation config.
pub fn load_config(cli_path: Option<&Path>) -> Result<(EvalConfig, ConfigSource)> {
    let (path, source) = resolve_config_path(cli_path)?;

    let mut config = match &path {
        Some(path) => EvalConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => EvalConfig::default(),
    };
    config.apply_env_overrides()?;
    validate_eval_config(&config)?;

    debug!(
        source = %source,
        path = ?path,
        quadrature_nodes = config.quadrature_nodes,
        mc_samples = config.mc_samples,
        "resolved evaluation config"
    );
    Ok((config, source))
}

/// Get the XDG config directory for infrabayes.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn missing_cli_path_is_error() {
        let err = resolve_config_path(Some(Path::new("/nonexistent/ib/config.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_xdg_config_dir() {
        if let Some(path) = xdg_config_dir() {
            assert!(path.ends_with(APP_NAME));
        }
    }
}
