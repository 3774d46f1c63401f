//! Catalog and alias data-source ports.
//!
//! The catalog is a document containing an array of priced entries,
//! loaded wholesale; the alias document maps
//! category -> { alias -> [canonical phrase, ...] }.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::catalog::{AliasTable, Catalog, CatalogEntry};

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog source '{source_name}' failed: {reason}")]
    SourceFailed { source_name: String, reason: String },

    #[error("All catalog sources failed: {0}")]
    AllSourcesFailed(String),

    #[error("Catalog document is malformed: {0}")]
    MalformedDocument(String),
}

/// Port for one catalog data source.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Source name, for failover logging.
    fn name(&self) -> &str;

    /// Loads the full entry list.
    async fn load(&self) -> Result<Vec<CatalogEntry>, CatalogError>;
}

/// Port the workflow reads the catalog through.
///
/// Implementations decide freshness; the caching adapter always
/// prefers a copy younger than the configured TTL over reloading.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Returns a catalog snapshot, reloading if the cached copy is
    /// stale or absent.
    async fn catalog(&self) -> Result<Arc<Catalog>, CatalogError>;

    /// Drops any cached copy so the next read reloads.
    async fn invalidate(&self);
}

/// Port for the alias document.
///
/// Loaded once at startup; failure is non-fatal and callers fall back
/// to an empty table.
#[async_trait]
pub trait AliasSource: Send + Sync {
    /// Loads the categorized alias map.
    async fn load(&self) -> Result<HashMap<String, HashMap<String, Vec<String>>>, CatalogError>;
}

/// Loads the alias table, degrading to empty on failure.
pub async fn load_alias_table(source: &dyn AliasSource) -> AliasTable {
    match source.load().await {
        Ok(categories) => AliasTable::from_categories(categories),
        Err(err) => {
            tracing::warn!(error = %err, "alias table unavailable, using pure fuzzy search");
            AliasTable::empty()
        }
    }
}
