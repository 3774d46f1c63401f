//! In-memory quote store.
//!
//! Double for tests and the console demo; stores committed quotes in
//! a process-local vector with assertion helpers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{PatientId, Price, QuoteId, Timestamp};
use crate::ports::{QuoteLineItem, QuoteStore, QuoteStoreError};

/// One committed quote as retained by the in-memory store.
#[derive(Debug, Clone)]
pub struct StoredQuote {
    pub id: QuoteId,
    pub patient: PatientId,
    pub line_items: Vec<QuoteLineItem>,
    pub total: Price,
    pub created_at: Timestamp,
}

/// Process-local quote store.
pub struct InMemoryQuoteStore {
    quotes: RwLock<Vec<StoredQuote>>,
    failing: AtomicBool,
}

impl InMemoryQuoteStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            quotes: RwLock::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every call fail, for persistence-failure tests.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All committed quotes (for test assertions).
    pub fn quotes(&self) -> Vec<StoredQuote> {
        self.quotes.read().map(|q| q.clone()).unwrap_or_default()
    }

    /// Number of committed quotes.
    pub fn quote_count(&self) -> usize {
        self.quotes.read().map(|q| q.len()).unwrap_or(0)
    }
}

impl Default for InMemoryQuoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn create(
        &self,
        patient: PatientId,
        line_items: Vec<QuoteLineItem>,
        total: Price,
    ) -> Result<QuoteId, QuoteStoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(QuoteStoreError::BackendError(
                "quote backend unavailable".to_string(),
            ));
        }
        if line_items.is_empty() {
            return Err(QuoteStoreError::EmptyQuote);
        }
        let id = QuoteId::new();
        self.quotes
            .write()
            .map_err(|_| QuoteStoreError::BackendError("quotes lock poisoned".to_string()))?
            .push(StoredQuote {
                id,
                patient,
                line_items,
                total,
                created_at: Timestamp::now(),
            });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CatalogEntryId;

    fn line(code: &str, cents: u64) -> QuoteLineItem {
        QuoteLineItem {
            catalog_id: CatalogEntryId::new(code),
            name: code.to_string(),
            price: Price::from_cents(cents),
        }
    }

    #[tokio::test]
    async fn create_stores_quote_with_items_and_total() {
        let store = InMemoryQuoteStore::new();
        let patient = PatientId::new();

        let id = store
            .create(patient, vec![line("HEM-01", 1500), line("GLI-01", 900)], Price::from_cents(2400))
            .await
            .unwrap();

        let quotes = store.quotes();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].id, id);
        assert_eq!(quotes[0].patient, patient);
        assert_eq!(quotes[0].line_items.len(), 2);
        assert_eq!(quotes[0].total, Price::from_cents(2400));
    }

    #[tokio::test]
    async fn create_rejects_empty_quotes() {
        let store = InMemoryQuoteStore::new();
        let result = store.create(PatientId::new(), vec![], Price::zero()).await;
        assert!(matches!(result, Err(QuoteStoreError::EmptyQuote)));
    }

    #[tokio::test]
    async fn failing_store_errors_instead_of_committing() {
        let store = InMemoryQuoteStore::new();
        store.set_failing(true);
        let result = store
            .create(PatientId::new(), vec![line("HEM-01", 1500)], Price::from_cents(1500))
            .await;
        assert!(result.is_err());
        assert_eq!(store.quote_count(), 0);
    }
}
