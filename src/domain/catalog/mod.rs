//! Catalog module - priced studies and the free-text matching engine.
//!
//! The catalog is loaded wholesale from an external document and kept
//! immutable in memory. Matching is a pure function over the loaded
//! catalog and normalized search terms.

mod alias;
mod entry;
mod matcher;
mod normalize;

pub use alias::AliasTable;
pub use entry::{Catalog, CatalogEntry};
pub use matcher::{CatalogMatcher, MatchCandidate, TermMatches};
pub use normalize::normalize_text;
