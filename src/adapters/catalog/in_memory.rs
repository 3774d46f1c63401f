//! In-memory catalog source for tests and as built-in demo fallback.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::catalog::CatalogEntry;
use crate::ports::{CatalogError, CatalogSource};

/// Serves a fixed entry list; can be toggled to fail and counts loads
/// so cache tests can assert on reload behavior.
pub struct InMemoryCatalogSource {
    entries: Vec<CatalogEntry>,
    failing: AtomicBool,
    loads: AtomicUsize,
}

impl InMemoryCatalogSource {
    /// Source serving the given entries.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            failing: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    /// Makes every load fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful loads served.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalogSource {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn load(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::SourceFailed {
                source_name: "in-memory".to_string(),
                reason: "source disabled".to_string(),
            });
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.clone())
    }
}
