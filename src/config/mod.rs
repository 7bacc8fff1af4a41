//! Engine configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! or a configuration file using the `config` and `dotenvy` crates. Environment
//! configuration uses the `MCDM_ENGINE` prefix and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use mcdm_engine::config::EngineConfig;
//!
//! let config = EngineConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Log filter: {}", config.logging.log_level);
//! ```

mod analysis;
mod error;
mod logging;

pub use analysis::AnalysisConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;

use std::path::Path;

use serde::Deserialize;

/// Root engine configuration
///
/// Every section has defaults, so an empty environment yields a usable config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Logging configuration (filter, output format)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Analysis configuration (strict consistency, per-method defaults)
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `MCDM_ENGINE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `MCDM_ENGINE__LOGGING__JSON=true` -> `logging.json = true`
    /// - `MCDM_ENGINE__ANALYSIS__METHOD_DEFAULTS__TOPSIS__DISTANCE_METRIC=manhattan`
    ///   -> `analysis.method_defaults.topsis.distance_metric = "manhattan"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a file, with environment variables on top
    ///
    /// The format follows the file extension (`.toml`, `.json`, `.yaml`, ...).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the log filter does not parse, or a method
    /// default names an unknown method or fails that method's validation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.analysis.validate()?;
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::default()
        .prefix("MCDM_ENGINE")
        .separator("__")
        .try_parsing(true)
}
