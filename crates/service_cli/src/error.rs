//! Error types of the command line interface.

use thiserror::Error;

use crate::config::ConfigError;
use reliability_core::types::ReliabilityError;

/// Result alias of the CLI.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors reported by the `reliability` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The reliability calculation failed.
    #[error("Calculation failed: {0}")]
    Reliability(#[from] ReliabilityError),

    /// A file given on the command line does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Invalid command line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Results could not be written.
    #[error("Output error: {0}")]
    Output(String),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

impl From<reliability_methods::ConfigError> for CliError {
    fn from(err: reliability_methods::ConfigError) -> Self {
        CliError::Config(ConfigError::Method(err))
    }
}
