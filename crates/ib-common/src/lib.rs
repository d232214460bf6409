//! Infrabayes common types.
//!
//! The error taxonomy shared by the config loader, the evaluation engine and
//! the CLI lives here so every crate reports failures with the same codes.

pub mod error;

pub use error::{Error, ErrorCategory, Result, StructuredError};
