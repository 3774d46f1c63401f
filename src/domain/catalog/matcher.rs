//! Catalog matching engine.
//!
//! Resolves free-text, typo-laden search terms into scored catalog
//! candidates. Pure function over the loaded catalog and alias table:
//! no I/O, no side effects, safe to call repeatedly.
//!
//! Per term the pipeline is: alias expansion -> normalization ->
//! per-entry scoring -> dedup by entry id -> sort by score descending.

use serde::{Deserialize, Serialize};

use super::{normalize_text, AliasTable, Catalog, CatalogEntry};

/// Score awarded when the normalized term equals the entry name or code.
const SCORE_EXACT: f32 = 100.0;
/// Base score when the entry name contains the term as a substring.
const SCORE_NAME_SUBSTRING: f32 = 90.0;
/// Base score when the entry code contains the term as a substring.
const SCORE_CODE_SUBSTRING: f32 = 85.0;
/// Weight of exact word matches in word-level scoring.
const WEIGHT_EXACT_WORD: f32 = 70.0;
/// Weight of partial word matches in word-level scoring.
const WEIGHT_PARTIAL_WORD: f32 = 50.0;
/// Bonus when the entry name or code starts with the term.
const PREFIX_BONUS: f32 = 15.0;
/// Bonus when every term token appears somewhere in the entry name.
const ALL_TOKENS_BONUS: f32 = 10.0;
/// Below this running score the Levenshtein fallback engages.
const TYPO_FALLBACK_CEILING: f32 = 30.0;
/// Minimum normalized similarity for the typo fallback to count.
const TYPO_MIN_SIMILARITY: f32 = 0.5;
/// Scale applied to the typo similarity when it wins.
const TYPO_SCALE: f32 = 50.0;
/// Minimum length of a token that may count as a partial (substring) match.
const MIN_PARTIAL_TOKEN_LEN: usize = 3;

/// A scored pairing of one search phrase with one catalog entry.
///
/// Transient: built per search, only retained inside conversation
/// state while a disambiguation pick is pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// The matched catalog entry.
    pub entry: CatalogEntry,
    /// Confidence score in `[0, 100]`.
    pub score: f32,
    /// The (possibly alias-expanded) phrase that produced this match.
    pub matched_term: String,
}

/// All candidates produced by one user search term, best first.
#[derive(Debug, Clone)]
pub struct TermMatches {
    /// The term as the user typed it (trimmed).
    pub term: String,
    /// Candidates with score above zero, sorted descending.
    pub candidates: Vec<MatchCandidate>,
}

impl TermMatches {
    /// Candidates at or above the given confidence threshold.
    pub fn qualifying(&self, threshold: f32) -> Vec<&MatchCandidate> {
        self.candidates
            .iter()
            .filter(|c| c.score >= threshold)
            .collect()
    }

    /// Best candidates below the threshold, for "did you mean" prompts.
    pub fn suggestions(&self, threshold: f32, limit: usize) -> Vec<&MatchCandidate> {
        self.candidates
            .iter()
            .filter(|c| c.score < threshold)
            .take(limit)
            .collect()
    }
}

/// The matching engine.
///
/// Stateless; constructed explicitly so tests can instantiate isolated
/// instances alongside fixture catalogs.
#[derive(Debug, Clone, Default)]
pub struct CatalogMatcher;

impl CatalogMatcher {
    /// Creates a matcher.
    pub fn new() -> Self {
        Self
    }

    /// Splits inbound free text into independent search terms.
    ///
    /// Terms are separated by commas or newlines; empty fragments are
    /// dropped.
    pub fn split_terms(text: &str) -> Vec<String> {
        text.split(|c| c == ',' || c == '\n' || c == ';')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Matches a batch of user search terms against the catalog.
    pub fn match_terms(
        &self,
        terms: &[String],
        catalog: &Catalog,
        aliases: &AliasTable,
    ) -> Vec<TermMatches> {
        terms
            .iter()
            .map(|t| self.match_term(t, catalog, aliases))
            .collect()
    }

    /// Matches a single user search term.
    ///
    /// When the normalized term hits an alias key, every canonical
    /// phrase of the alias is searched and the results are merged;
    /// duplicates by entry id keep the first phrase's candidate.
    pub fn match_term(&self, term: &str, catalog: &Catalog, aliases: &AliasTable) -> TermMatches {
        let phrases: Vec<String> = match aliases.expand(term) {
            Some(targets) => targets.to_vec(),
            None => vec![term.to_string()],
        };

        let mut candidates: Vec<MatchCandidate> = Vec::new();
        for phrase in &phrases {
            let normalized = normalize_text(phrase);
            if normalized.is_empty() {
                continue;
            }
            for entry in catalog.entries() {
                let score = score_entry(&normalized, entry);
                if score <= 0.0 {
                    continue;
                }
                // First match wins across expanded phrases.
                if candidates.iter().any(|c| c.entry.id == entry.id) {
                    continue;
                }
                candidates.push(MatchCandidate {
                    entry: entry.clone(),
                    score,
                    matched_term: phrase.clone(),
                });
            }
        }

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        TermMatches {
            term: term.trim().to_string(),
            candidates,
        }
    }
}

/// Scores one normalized term against one catalog entry.
///
/// Returns a confidence in `[0, 100]`; see the module docs for the
/// rule ladder.
fn score_entry(term: &str, entry: &CatalogEntry) -> f32 {
    let name = entry.normalized_name();
    let code = entry.normalized_code();

    if term == name || (!code.is_empty() && term == code) {
        return SCORE_EXACT;
    }

    let mut score: f32 = 0.0;
    if name.contains(term) {
        score = SCORE_NAME_SUBSTRING;
    } else if !code.is_empty() && code.contains(term) {
        score = SCORE_CODE_SUBSTRING;
    }

    let name_tokens: Vec<&str> = name.split_whitespace().collect();
    let code_tokens: Vec<&str> = code.split_whitespace().collect();
    // Single-character fragments carry no signal.
    let term_tokens: Vec<&str> = term.split_whitespace().filter(|t| t.len() > 1).collect();

    if !term_tokens.is_empty() {
        let mut exact = 0usize;
        let mut partial = 0usize;
        for token in &term_tokens {
            if name_tokens.contains(token) {
                exact += 1;
            } else if partial_word_match(token, &name_tokens) {
                partial += 1;
            } else if code_tokens.contains(token) {
                exact += 1;
            } else if partial_word_match(token, &code_tokens) {
                partial += 1;
            }
        }
        let count = term_tokens.len() as f32;
        let word_score =
            WEIGHT_EXACT_WORD * exact as f32 / count + WEIGHT_PARTIAL_WORD * partial as f32 / count;
        score = score.max(word_score);
    }

    if name.starts_with(term) || (!code.is_empty() && code.starts_with(term)) {
        score += PREFIX_BONUS;
    }

    if score < TYPO_FALLBACK_CEILING {
        let similarity = best_typo_similarity(term, name, &name_tokens);
        if similarity > TYPO_MIN_SIMILARITY {
            score = score.max(similarity * TYPO_SCALE);
        }
    }

    if term_tokens.len() > 1 {
        let all_present = term_tokens.iter().all(|token| {
            name_tokens.iter().any(|w| {
                (w.contains(token) && token.len() >= MIN_PARTIAL_TOKEN_LEN)
                    || (token.contains(w) && w.len() >= MIN_PARTIAL_TOKEN_LEN)
                    || w == token
            })
        });
        if all_present {
            score += ALL_TOKENS_BONUS;
        }
    }

    score.clamp(0.0, 100.0)
}

/// True when the token partially matches some word of the haystack:
/// one is a substring of the other, and the contained side is at least
/// three characters long.
fn partial_word_match(token: &str, haystack: &[&str]) -> bool {
    haystack.iter().any(|w| {
        (w.contains(token) && token.len() >= MIN_PARTIAL_TOKEN_LEN)
            || (token.contains(w) && w.len() >= MIN_PARTIAL_TOKEN_LEN)
    })
}

/// Best normalized Levenshtein similarity of the term against the full
/// entry name and each of its words.
///
/// Comparing against individual words matters for multi-word names: a
/// one-letter typo of "hemograma" is still far from "hemograma
/// completo" as a whole but close to its first word.
fn best_typo_similarity(term: &str, name: &str, name_tokens: &[&str]) -> f32 {
    std::iter::once(name)
        .chain(name_tokens.iter().copied())
        .map(|target| normalized_similarity(term, target))
        .fold(0.0, f32::max)
}

fn normalized_similarity(a: &str, b: &str) -> f32 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    1.0 - strsim::levenshtein(a, b) as f32 / longest as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CatalogEntryId, Price};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn entry(name: &str, code: &str, cents: u64) -> CatalogEntry {
        CatalogEntry::new(CatalogEntryId::new(code), name, code, Price::from_cents(cents))
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            entry("Hemograma Completo", "HEM-01", 1500),
            entry("Glicemia en Ayunas", "GLI-01", 900),
            entry("Perfil Lipídico", "LIP-01", 2500),
            entry("Examen de Orina", "ORI-01", 800),
        ])
    }

    fn match_one(term: &str) -> TermMatches {
        CatalogMatcher::new().match_term(term, &sample_catalog(), &AliasTable::empty())
    }

    fn top_score(term: &str) -> f32 {
        match_one(term).candidates.first().map(|c| c.score).unwrap_or(0.0)
    }

    mod term_splitting {
        use super::*;

        #[test]
        fn splits_on_commas_and_newlines() {
            let terms = CatalogMatcher::split_terms("hemograma, glicemia\norina");
            assert_eq!(terms, vec!["hemograma", "glicemia", "orina"]);
        }

        #[test]
        fn drops_empty_fragments() {
            let terms = CatalogMatcher::split_terms("hemograma, , \n");
            assert_eq!(terms, vec!["hemograma"]);
        }
    }

    mod scoring {
        use super::*;

        #[test]
        fn exact_normalized_name_scores_exactly_100() {
            assert_eq!(top_score("Hemograma Completo"), 100.0);
            assert_eq!(top_score("hemograma completo"), 100.0);
        }

        #[test]
        fn exact_code_scores_exactly_100() {
            assert_eq!(top_score("HEM-01"), 100.0);
        }

        #[test]
        fn name_substring_scores_at_least_90() {
            let matches = match_one("hemograma");
            let best = &matches.candidates[0];
            assert_eq!(best.entry.code, "HEM-01");
            assert!(best.score >= 90.0);
        }

        #[test]
        fn one_letter_typo_engages_fallback_below_substring_tier() {
            let matches = match_one("Hemograna");
            let best = matches
                .candidates
                .iter()
                .find(|c| c.entry.code == "HEM-01")
                .expect("typo fallback should still surface the entry");
            assert!(best.score > 0.0);
            assert!(best.score < 90.0);
        }

        #[test]
        fn diacritics_do_not_affect_matching() {
            let matches = match_one("perfil lipidico");
            assert_eq!(matches.candidates[0].entry.code, "LIP-01");
            assert_eq!(matches.candidates[0].score, 100.0);
        }

        #[test]
        fn unrelated_term_produces_no_candidates() {
            assert!(match_one("resonancia magnetica").candidates.is_empty());
        }

        #[test]
        fn candidates_are_sorted_descending() {
            let matches = match_one("examen orina");
            for pair in matches.candidates.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
        }

        proptest! {
            #[test]
            fn score_is_always_within_bounds(term in ".{0,32}") {
                let catalog = sample_catalog();
                let normalized = normalize_text(&term);
                if !normalized.is_empty() {
                    for e in catalog.entries() {
                        let s = score_entry(&normalized, e);
                        prop_assert!((0.0..=100.0).contains(&s));
                    }
                }
            }
        }
    }

    mod qualifying_and_suggestions {
        use super::*;

        #[test]
        fn qualifying_filters_by_threshold() {
            let matches = match_one("hemograma");
            assert_eq!(matches.qualifying(70.0).len(), 1);
            assert!(matches.qualifying(100.1).is_empty());
        }

        #[test]
        fn suggestions_are_capped() {
            let matches = match_one("Hemograna");
            assert!(matches.suggestions(70.0, 5).len() <= 5);
        }
    }

    mod alias_expansion {
        use super::*;

        fn alias_table() -> AliasTable {
            let mut perfiles = HashMap::new();
            perfiles.insert(
                "chequeo basico".to_string(),
                vec![
                    "Hemograma Completo".to_string(),
                    "Glicemia en Ayunas".to_string(),
                ],
            );
            let mut categories = HashMap::new();
            categories.insert("perfiles".to_string(), perfiles);
            AliasTable::from_categories(categories)
        }

        #[test]
        fn alias_term_yields_candidates_for_every_canonical_phrase() {
            let matches = CatalogMatcher::new().match_term(
                "chequeo básico",
                &sample_catalog(),
                &alias_table(),
            );
            let codes: Vec<&str> = matches
                .qualifying(70.0)
                .iter()
                .map(|c| c.entry.code.as_str())
                .collect();
            assert!(codes.contains(&"HEM-01"));
            assert!(codes.contains(&"GLI-01"));
        }

        #[test]
        fn candidates_are_deduplicated_by_entry_id() {
            let matches = CatalogMatcher::new().match_term(
                "chequeo basico",
                &sample_catalog(),
                &alias_table(),
            );
            let mut ids: Vec<_> = matches.candidates.iter().map(|c| &c.entry.id).collect();
            let before = ids.len();
            ids.dedup();
            assert_eq!(ids.len(), before);
        }
    }
}
