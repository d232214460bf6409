//! Structured logging for the `ib-core` binary.
//!
//! stdout carries command payloads (JSON); every log line goes to stderr,
//! either as compact human text or as JSON lines. Library code only emits
//! `tracing` events and never installs a subscriber itself.
//!
//! ```ignore
//! use ib_core::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config);
//! ```

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events pass the filter.
const CRATES: [&str; 4] = ["ib_core", "ib_config", "ib_math", "ib_common"];

fn filter_for(config: &LogConfig) -> EnvFilter {
    let directives: Vec<String> = CRATES
        .iter()
        .map(|krate| format!("{krate}={}", config.level))
        .collect();
    EnvFilter::new(directives.join(","))
}

/// Install the global subscriber.
///
/// Returns false if a subscriber was already installed, in which case the
/// existing one is kept.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = filter_for(config);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Human => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                registry.with(layer).try_init().is_ok()
            } else {
                registry.with(layer.without_time()).try_init().is_ok()
            }
        }
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init()
            .is_ok(),
    }
}
