//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidLogFilter { filter: String, reason: String },

    #[error("Unknown method in analysis.method_defaults: {0}")]
    UnknownMethod(String),

    #[error("Invalid default parameters for {method}: {}", errors.join("; "))]
    InvalidMethodDefaults { method: String, errors: Vec<String> },
}
