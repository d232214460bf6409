//! Core math modules.

pub mod entropy;
pub mod hermite;
