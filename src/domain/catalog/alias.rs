//! Alias table - colloquial phrases expanded before matching.
//!
//! Patients rarely type formal study names; "chequeo basico" should
//! search for the canonical panel entries it stands for. The table is
//! loaded once at startup from a document mapping
//! category -> { alias -> [canonical phrase, ...] }; categories exist
//! only for document organization and are flattened away here.

use std::collections::HashMap;

use super::normalize_text;

/// Mapping from a normalized alias phrase to the canonical search
/// phrases substituted in before matching.
///
/// Load failure is non-fatal: an empty table degrades to pure fuzzy
/// search.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, Vec<String>>,
}

impl AliasTable {
    /// Empty table (pure fuzzy search).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from categorized alias documents.
    ///
    /// Alias keys are normalized; duplicate keys across categories are
    /// merged, preserving document order.
    pub fn from_categories(categories: HashMap<String, HashMap<String, Vec<String>>>) -> Self {
        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
        for (_, entries) in categories {
            for (alias, targets) in entries {
                aliases
                    .entry(normalize_text(&alias))
                    .or_default()
                    .extend(targets);
            }
        }
        aliases.retain(|k, v| !k.is_empty() && !v.is_empty());
        Self { aliases }
    }

    /// Expands a term into its canonical phrases.
    ///
    /// The term is normalized and must match an alias key exactly;
    /// returns `None` when no alias applies (the caller searches the
    /// original term instead).
    pub fn expand(&self, term: &str) -> Option<&[String]> {
        self.aliases
            .get(&normalize_text(term))
            .map(|targets| targets.as_slice())
    }

    /// Number of alias keys loaded.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// True when no aliases are loaded.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
