//! Quote Store Port - persistence of committed quotes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogEntry;
use crate::domain::foundation::{CatalogEntryId, PatientId, Price, QuoteId};

/// One line of a quote: a catalog study at quantity one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLineItem {
    pub catalog_id: CatalogEntryId,
    pub name: String,
    pub price: Price,
}

impl From<&CatalogEntry> for QuoteLineItem {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            catalog_id: entry.id.clone(),
            name: entry.display_name.clone(),
            price: entry.price,
        }
    }
}

/// Errors from quote persistence.
#[derive(Debug, thiserror::Error)]
pub enum QuoteStoreError {
    #[error("Quote backend error: {0}")]
    BackendError(String),

    #[error("Quote must contain at least one line item")]
    EmptyQuote,
}

/// Port for the external quote store.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Persists a quote and returns its reference.
    async fn create(
        &self,
        patient: PatientId,
        line_items: Vec<QuoteLineItem>,
        total: Price,
    ) -> Result<QuoteId, QuoteStoreError>;
}
