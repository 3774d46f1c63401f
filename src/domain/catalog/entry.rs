//! Catalog entries and the loaded catalog snapshot.

use serde::{Deserialize, Serialize};

use super::normalize_text;
use crate::domain::foundation::{CatalogEntryId, Price};

/// One priced study/test offered by the laboratory.
///
/// Immutable once loaded. The normalized projections of the display
/// name and code are derived at construction so the matching engine
/// never re-normalizes catalog text per search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog document id, opaque.
    pub id: CatalogEntryId,
    /// Human-facing study name, as printed on quotes.
    pub display_name: String,
    /// Short laboratory code (e.g. "HEM-01").
    pub code: String,
    /// Unit price.
    pub price: Price,
    /// `display_name` normalized for matching.
    normalized_name: String,
    /// `code` normalized for matching.
    normalized_code: String,
}

impl CatalogEntry {
    /// Builds an entry, deriving the normalized projections.
    pub fn new(
        id: CatalogEntryId,
        display_name: impl Into<String>,
        code: impl Into<String>,
        price: Price,
    ) -> Self {
        let display_name = display_name.into();
        let code = code.into();
        let normalized_name = normalize_text(&display_name);
        let normalized_code = normalize_text(&code);
        Self {
            id,
            display_name,
            code,
            price,
            normalized_name,
            normalized_code,
        }
    }

    /// Returns the normalized display name.
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// Returns the normalized code.
    pub fn normalized_code(&self) -> &str {
        &self.normalized_code
    }
}

/// An immutable snapshot of the full price catalog.
///
/// The catalog is reloaded wholesale on cache expiry or manual
/// invalidation; there are no partial updates.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Builds a snapshot from loaded entries.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Returns all entries.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries in this snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks an entry up by id.
    pub fn find(&self, id: &CatalogEntryId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, code: &str) -> CatalogEntry {
        CatalogEntry::new(
            CatalogEntryId::new(code),
            name,
            code,
            Price::from_cents(1000),
        )
    }

    #[test]
    fn derives_normalized_projections_on_construction() {
        let e = entry("Glicemia en Ayunas", "GLI-01");
        assert_eq!(e.normalized_name(), "glicemia en ayunas");
        assert_eq!(e.normalized_code(), "gli 01");
    }

    #[test]
    fn find_locates_entry_by_id() {
        let catalog = Catalog::new(vec![entry("Hemograma Completo", "HEM-01")]);
        assert!(catalog.find(&CatalogEntryId::new("HEM-01")).is_some());
        assert!(catalog.find(&CatalogEntryId::new("XXX")).is_none());
    }

    #[test]
    fn empty_catalog_reports_empty() {
        assert!(Catalog::default().is_empty());
    }
}
