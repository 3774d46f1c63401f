//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using
//! the `config` and `dotenvy` crates. Configuration is loaded with the
//! `LABQUOTE_` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use labquote::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Session TTL: {}s", config.intake.session_ttl_secs);
//! ```

mod catalog;
mod error;
mod intake;

pub use catalog::CatalogConfig;
pub use error::{ConfigError, ValidationError};
pub use intake::IntakeConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Intake workflow tunables (attempt budget, TTL, match threshold)
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Catalog loading (source paths, cache TTL)
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Rust log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LABQUOTE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LABQUOTE__INTAKE__SESSION_TTL_SECS=7200` -> `intake.session_ttl_secs = 7200`
    /// - `LABQUOTE__CATALOG__SOURCES=a.json,b.json` -> `catalog.sources = [a.json, b.json]`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the
    /// expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().prefix("LABQUOTE").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.intake.validate()?;
        self.catalog.validate()?;
        Ok(())
    }
}

fn default_log_level() -> String {
    "info,labquote=debug".to_string()
}
