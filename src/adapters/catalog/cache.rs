//! Caching catalog provider.
//!
//! A cached copy younger than the TTL is always preferred over
//! reloading; expiry or manual invalidation triggers a wholesale
//! reload through the underlying source. Stale reads up to one TTL
//! are the accepted trade-off, since the data source emits no
//! invalidation signal.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::catalog::Catalog;
use crate::ports::{CatalogError, CatalogProvider, CatalogSource};

struct CachedCopy {
    catalog: Arc<Catalog>,
    loaded_at: Instant,
}

/// TTL cache in front of a catalog source.
pub struct CachedCatalogProvider {
    source: Arc<dyn CatalogSource>,
    ttl: Duration,
    cached: RwLock<Option<CachedCopy>>,
}

impl CachedCatalogProvider {
    /// Cache over `source` with the given freshness window.
    pub fn new(source: Arc<dyn CatalogSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: RwLock::new(None),
        }
    }

    fn fresh(&self, copy: &CachedCopy) -> bool {
        copy.loaded_at.elapsed() < self.ttl
    }
}

#[async_trait]
impl CatalogProvider for CachedCatalogProvider {
    async fn catalog(&self) -> Result<Arc<Catalog>, CatalogError> {
        {
            let cached = self.cached.read().await;
            if let Some(copy) = cached.as_ref() {
                if self.fresh(copy) {
                    return Ok(Arc::clone(&copy.catalog));
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have reloaded while we waited for the lock.
        if let Some(copy) = cached.as_ref() {
            if self.fresh(copy) {
                return Ok(Arc::clone(&copy.catalog));
            }
        }

        let entries = self.source.load().await?;
        let catalog = Arc::new(Catalog::new(entries));
        info!(entries = catalog.len(), source = self.source.name(), "catalog reloaded");
        *cached = Some(CachedCopy {
            catalog: Arc::clone(&catalog),
            loaded_at: Instant::now(),
        });
        Ok(catalog)
    }

    async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::InMemoryCatalogSource;
    use crate::domain::catalog::CatalogEntry;
    use crate::domain::foundation::{CatalogEntryId, Price};

    fn source() -> Arc<InMemoryCatalogSource> {
        Arc::new(InMemoryCatalogSource::new(vec![CatalogEntry::new(
            CatalogEntryId::new("HEM-01"),
            "Hemograma Completo",
            "HEM-01",
            Price::from_cents(1500),
        )]))
    }

    #[tokio::test]
    async fn serves_cached_copy_within_ttl() {
        let source = source();
        let provider = CachedCatalogProvider::new(source.clone(), Duration::from_secs(300));

        provider.catalog().await.unwrap();
        provider.catalog().await.unwrap();

        assert_eq!(source.load_count(), 1);
    }

    #[tokio::test]
    async fn reloads_after_ttl_expiry() {
        let source = source();
        let provider = CachedCatalogProvider::new(source.clone(), Duration::from_millis(0));

        provider.catalog().await.unwrap();
        provider.catalog().await.unwrap();

        assert_eq!(source.load_count(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let source = source();
        let provider = CachedCatalogProvider::new(source.clone(), Duration::from_secs(300));

        provider.catalog().await.unwrap();
        provider.invalidate().await;
        provider.catalog().await.unwrap();

        assert_eq!(source.load_count(), 2);
    }

    #[tokio::test]
    async fn cached_copy_survives_source_outage() {
        let source = source();
        let provider = CachedCatalogProvider::new(source.clone(), Duration::from_secs(300));

        provider.catalog().await.unwrap();
        source.set_failing(true);
        // Within the TTL the failure is never observed.
        let catalog = provider.catalog().await.unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn load_failure_propagates_when_no_cache() {
        let source = source();
        source.set_failing(true);
        let provider = CachedCatalogProvider::new(source, Duration::from_secs(300));
        assert!(provider.catalog().await.is_err());
    }
}
