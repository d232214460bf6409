//! Process exit codes for the `ib-core` binary.
//!
//! - 0-9: the command ran; the code says what it found
//! - 10-19: bad input the user can fix
//! - 20-29: I/O or internal failures

use ib_common::{Error, ErrorCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed.
    Ok = 0,
    /// `check` found a quadrature/Monte Carlo gap above tolerance.
    CheckFailed = 1,

    /// Invalid configuration or arguments.
    ConfigError = 10,
    /// Scenario file could not be parsed or built.
    ScenarioError = 11,
    /// A measure or polytope could not be evaluated.
    EvaluationError = 12,

    /// Reading input or writing output failed.
    IoError = 20,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes 10 and up.
    pub fn is_error(self) -> bool {
        self.as_i32() >= 10
    }

    /// Stable name for JSON output.
    pub fn code_name(self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::CheckFailed => "CHECK_FAILED",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::ScenarioError => "ERR_SCENARIO",
            ExitCode::EvaluationError => "ERR_EVALUATION",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a failed command.
    pub fn for_error(err: &Error) -> Self {
        match (err, err.category()) {
            (Error::Scenario(_), _) => ExitCode::ScenarioError,
            // Malformed scenario text surfaces as a parse error.
            (Error::Json(_) | Error::Toml(_), _) => ExitCode::ScenarioError,
            (_, ErrorCategory::Config) => ExitCode::ConfigError,
            (_, ErrorCategory::Evaluation) => ExitCode::EvaluationError,
            (_, ErrorCategory::Io) => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
