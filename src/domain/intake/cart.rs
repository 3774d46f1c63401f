//! The in-progress study cart.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogEntry;
use crate::domain::foundation::Price;

/// Ordered list of catalog entries accumulated during cart building.
///
/// Quantity is always one; becomes the line-item list of the eventual
/// quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CatalogEntry>,
}

impl Cart {
    /// Empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, keeping insertion order.
    ///
    /// Returns false when an entry with the same id is already in the
    /// cart (a study is quoted at most once).
    pub fn add(&mut self, entry: CatalogEntry) -> bool {
        if self.items.iter().any(|e| e.id == entry.id) {
            return false;
        }
        self.items.push(entry);
        true
    }

    /// The accumulated entries, in insertion order.
    pub fn items(&self) -> &[CatalogEntry] {
        &self.items
    }

    /// Sum of unit prices.
    pub fn total(&self) -> Price {
        self.items.iter().map(|e| e.price).sum()
    }

    /// Number of studies in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CatalogEntryId;

    fn entry(code: &str, cents: u64) -> CatalogEntry {
        CatalogEntry::new(CatalogEntryId::new(code), code, code, Price::from_cents(cents))
    }

    #[test]
    fn total_sums_unit_prices() {
        let mut cart = Cart::new();
        cart.add(entry("HEM-01", 1500));
        cart.add(entry("GLI-01", 900));
        assert_eq!(cart.total(), Price::from_cents(2400));
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let mut cart = Cart::new();
        assert!(cart.add(entry("HEM-01", 1500)));
        assert!(!cart.add(entry("HEM-01", 1500)));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add(entry("B", 100));
        cart.add(entry("A", 200));
        let codes: Vec<&str> = cart.items().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["B", "A"]);
    }
}
