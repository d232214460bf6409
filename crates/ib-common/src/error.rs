//! Error types for infrabayes.
//!
//! Every error carries a stable code and a category. Evaluation errors are
//! never retried: each one names a permanent problem with the inputs (an
//! unsupported family, a missing batch axis, an operand with no meaning) that
//! the caller has to fix.
//!
//! Errors serialize to structured JSON for the CLI:
//! ```json
//! {
//!   "code": 30,
//!   "category": "evaluation",
//!   "message": "expected values not implemented for uniform distributions"
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for infrabayes operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration and scenario file errors.
    Config,
    /// Construction or evaluation of measures and polytopes.
    Evaluation,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Evaluation => write!(f, "evaluation"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for infrabayes.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid scenario: {0}")]
    Scenario(String),

    // Evaluation errors (30-39)
    #[error("expected values not implemented for {family} distributions")]
    UnsupportedDistribution { family: String },

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("cannot add {found} to an sa-measure")]
    TypeMismatch { found: String },

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 30-39: Evaluation errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::Scenario(_) => 11,
            Error::UnsupportedDistribution { .. } => 30,
            Error::InvalidShape(_) => 31,
            Error::TypeMismatch { .. } => 32,
            Error::NotImplemented(_) => 33,
            Error::ShapeMismatch { .. } => 34,
            Error::InvalidParameter { .. } => 35,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::Toml(_) => 62,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::Scenario(_) => ErrorCategory::Config,

            Error::UnsupportedDistribution { .. }
            | Error::InvalidShape(_)
            | Error::TypeMismatch { .. }
            | Error::NotImplemented(_)
            | Error::ShapeMismatch { .. }
            | Error::InvalidParameter { .. } => ErrorCategory::Evaluation,

            Error::Io(_) | Error::Json(_) | Error::Toml(_) => ErrorCategory::Io,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::Scenario(_) => "Invalid Scenario",
            Error::UnsupportedDistribution { .. } => "Unsupported Distribution",
            Error::InvalidShape(_) => "Invalid Shape",
            Error::TypeMismatch { .. } => "Type Mismatch",
            Error::NotImplemented(_) => "Not Implemented",
            Error::ShapeMismatch { .. } => "Shape Mismatch",
            Error::InvalidParameter { .. } => "Invalid Parameter",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
            Error::Toml(_) => "TOML Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}
