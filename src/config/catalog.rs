//! Catalog loading configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Catalog source and cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Cached catalog freshness window in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Catalog document paths, tried in order (comma-separated)
    pub sources: Option<String>,

    /// Alias document path
    pub alias_path: Option<String>,
}

impl CatalogConfig {
    /// Source paths as a vector, first is the primary
    pub fn source_list(&self) -> Vec<String> {
        self.sources
            .as_ref()
            .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// Validate catalog configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cache_ttl_secs == 0 {
            return Err(ValidationError::InvalidCatalogTtl);
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            sources: None,
            alias_path: None,
        }
    }
}

fn default_cache_ttl() -> u64 {
    300
}
