//! Failover catalog source.
//!
//! Tries a fixed, ordered list of sources and serves the first one
//! that succeeds. Exhausting every source is a hard error for callers
//! needing fresh data; the caching provider shields conversations
//! from transient outages.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::catalog::CatalogEntry;
use crate::ports::{CatalogError, CatalogSource};

/// Ordered chain of catalog sources.
pub struct FailoverCatalogSource {
    sources: Vec<Arc<dyn CatalogSource>>,
}

impl FailoverCatalogSource {
    /// Chain trying `sources` in order.
    pub fn new(sources: Vec<Arc<dyn CatalogSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl CatalogSource for FailoverCatalogSource {
    fn name(&self) -> &str {
        "failover"
    }

    async fn load(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut failures: Vec<String> = Vec::new();
        for source in &self.sources {
            match source.load().await {
                Ok(entries) => return Ok(entries),
                Err(err) => {
                    warn!(source = source.name(), error = %err, "catalog source failed, trying next");
                    failures.push(format!("{}: {}", source.name(), err));
                }
            }
        }
        Err(CatalogError::AllSourcesFailed(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::InMemoryCatalogSource;
    use crate::domain::foundation::{CatalogEntryId, Price};

    fn entry(code: &str) -> CatalogEntry {
        CatalogEntry::new(CatalogEntryId::new(code), code, code, Price::from_cents(100))
    }

    #[tokio::test]
    async fn first_healthy_source_wins() {
        let primary = Arc::new(InMemoryCatalogSource::new(vec![entry("PRIMARY")]));
        let fallback = Arc::new(InMemoryCatalogSource::new(vec![entry("FALLBACK")]));
        primary.set_failing(true);
        let chain = FailoverCatalogSource::new(vec![primary.clone(), fallback.clone()]);

        let entries = chain.load().await.unwrap();
        assert_eq!(entries[0].code, "FALLBACK");
        assert_eq!(fallback.load_count(), 1);
    }

    #[tokio::test]
    async fn healthy_primary_shields_fallback() {
        let primary = Arc::new(InMemoryCatalogSource::new(vec![entry("PRIMARY")]));
        let fallback = Arc::new(InMemoryCatalogSource::new(vec![entry("FALLBACK")]));
        let chain = FailoverCatalogSource::new(vec![primary, fallback.clone()]);

        let entries = chain.load().await.unwrap();
        assert_eq!(entries[0].code, "PRIMARY");
        assert_eq!(fallback.load_count(), 0);
    }

    #[tokio::test]
    async fn exhaustion_reports_every_failure() {
        let a = Arc::new(InMemoryCatalogSource::new(vec![]));
        let b = Arc::new(InMemoryCatalogSource::new(vec![]));
        a.set_failing(true);
        b.set_failing(true);
        let chain = FailoverCatalogSource::new(vec![a, b]);

        match chain.load().await {
            Err(CatalogError::AllSourcesFailed(reasons)) => {
                assert!(reasons.contains("in-memory"));
            }
            other => panic!("expected AllSourcesFailed, got {:?}", other.map(|e| e.len())),
        }
    }
}
