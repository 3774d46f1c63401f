//! Text normalization for catalog matching.
//!
//! All comparisons in the matching engine run over normalized text:
//! lowercase, diacritics stripped, everything outside `[a-z0-9\s]`
//! removed, whitespace collapsed. The same function normalizes catalog
//! names, codes, alias keys, and inbound search terms so they meet on
//! equal footing.

use unicode_normalization::UnicodeNormalization;

/// Normalizes text for matching.
///
/// Performs, in order:
/// - Unicode NFD decomposition, dropping combining marks (so `á` -> `a`)
/// - lowercase conversion
/// - replacement of every character outside `[a-z0-9]` with a space
/// - whitespace collapse and trim
///
/// The function is idempotent: normalizing already-normalized text
/// returns it unchanged.
///
/// # Examples
///
/// ```
/// use labquote::domain::catalog::normalize_text;
///
/// assert_eq!(normalize_text("Glicemia en Ayunas"), "glicemia en ayunas");
/// assert_eq!(normalize_text("  PERFIL-20, básico  "), "perfil 20 basico");
/// ```
pub fn normalize_text(s: &str) -> String {
    let stripped: String = s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() {
                c
            } else {
                ' '
            }
        })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_combining_mark(c: char) -> bool {
    // Combining Diacritical Marks block, enough for the Latin input the
    // lab's catalog and patients produce.
    ('\u{0300}'..='\u{036F}').contains(&c)
}
