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
    #[error("Verification attempt budget must be at least 1")]
    InvalidAttemptBudget,

    #[error("Session TTL must be at least 60 seconds")]
    InvalidSessionTtl,

    #[error("Match threshold must lie in (0, 100]")]
    InvalidMatchThreshold,

    #[error("Suggestion and option limits must be at least 1")]
    InvalidListLimit,

    #[error("Catalog cache TTL must be at least 1 second")]
    InvalidCatalogTtl,
}
