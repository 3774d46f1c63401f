//! Inbound text interpretation: token sets and field parsers.
//!
//! All token comparison runs over normalized text so "Sí.", "si" and
//! "SI" are the same answer.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;

use super::Sex;
use crate::domain::catalog::normalize_text;

static CANCEL_TOKENS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["cancelar", "cancela", "cancel", "salir", "cancelar todo"]);

static AFFIRMATIVE_TOKENS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "si", "s", "yes", "confirmo", "confirmar", "dale", "ok", "claro", "de acuerdo", "correcto",
    ]
});

static NEGATIVE_TOKENS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["no", "n", "nada", "mejor no"]);

static DONE_TOKENS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "listo", "ya", "terminar", "finalizar", "termine", "fin", "ok", "done", "es todo",
        "nada mas", "seria todo",
    ]
});

static ALL_TOKENS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["todo", "todos", "todas", "all"]);

static NO_EMAIL_TOKENS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["no", "no tengo", "ninguno", "ninguna", "none", "n a", "sin correo"]
});

static MONTHS: [(&str, u32); 12] = [
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

fn matches_token_set(text: &str, tokens: &[&str]) -> bool {
    let normalized = normalize_text(text);
    tokens.contains(&normalized.as_str())
}

/// Explicit cancellation, honored at every step.
pub fn is_cancel(text: &str) -> bool {
    let normalized = normalize_text(text);
    matches_token_set(text, &CANCEL_TOKENS)
        // Bot-command style cancellation.
        || normalized == "cancel" || text.trim().eq_ignore_ascii_case("/cancel")
        || text.trim().eq_ignore_ascii_case("/cancelar")
}

/// Final quote confirmation.
pub fn is_affirmative(text: &str) -> bool {
    matches_token_set(text, &AFFIRMATIVE_TOKENS)
}

/// Quote rejection at the confirmation step.
pub fn is_negative(text: &str) -> bool {
    matches_token_set(text, &NEGATIVE_TOKENS)
}

/// Cart-closing token ("listo", "ok", ...).
pub fn is_done(text: &str) -> bool {
    matches_token_set(text, &DONE_TOKENS)
}

/// "Add every offered candidate" during study disambiguation.
pub fn is_select_all(text: &str) -> bool {
    matches_token_set(text, &ALL_TOKENS)
}

/// Explicit "no email" answer during registration.
pub fn declines_email(text: &str) -> bool {
    matches_token_set(text, &NO_EMAIL_TOKENS) || text.trim() == "-"
}

/// Parses a 1-based selection into `1..=max`.
pub fn parse_selection(text: &str, max: usize) -> Option<usize> {
    let n: usize = text.trim().parse().ok()?;
    (1..=max).contains(&n).then_some(n)
}

/// Accepts a raw document id when it looks plausible: at least five
/// digits once separators are ignored.
pub fn parse_document_id(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
    (digits >= 5).then(|| trimmed.to_string())
}

/// Parses a month as a number (1-12) or a Spanish name/abbreviation.
pub fn parse_month(text: &str) -> Option<u32> {
    let normalized = normalize_text(text);
    if let Ok(n) = normalized.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    MONTHS.iter().find_map(|(name, number)| {
        (*name == normalized || (normalized.len() >= 3 && name.starts_with(&normalized)))
            .then_some(*number)
    })
}

/// Parses a strict `DD/MM/YYYY` birth date.
///
/// The shape is checked before chrono parses it, so "1/2/1990" is
/// rejected rather than silently accepted.
pub fn parse_birth_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return None;
    }
    if !trimmed
        .chars()
        .enumerate()
        .all(|(i, c)| if i == 2 || i == 5 { c == '/' } else { c.is_ascii_digit() })
    {
        return None;
    }
    let date = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok()?;
    // A birth date must be in the past and within a plausible range.
    let today = chrono::Utc::now().date_naive();
    (date < today && date.year() >= 1900).then_some(date)
}

/// Parses a sex answer: single letter or full Spanish word.
pub fn parse_sex(text: &str) -> Option<Sex> {
    match normalize_text(text).as_str() {
        "m" | "masculino" | "hombre" | "varon" => Some(Sex::M),
        "f" | "femenino" | "mujer" | "femenina" => Some(Sex::F),
        _ => None,
    }
}

/// Accepts a phone number containing at least ten digits; returns the
/// digits only.
pub fn parse_phone(text: &str) -> Option<String> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() >= 10).then_some(digits)
}

/// Minimal email plausibility check.
pub fn parse_email(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let (local, domain) = trimmed.split_once('@')?;
    (!local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .then(|| trimmed.to_string())
}

/// Lenient surname check: normalized equality or mutual substring
/// containment, tolerating partial or compound surnames.
pub fn surname_matches(answer: &str, registered: &str) -> bool {
    let answer = normalize_text(answer);
    let registered = normalize_text(registered);
    if answer.is_empty() || registered.is_empty() {
        return false;
    }
    answer == registered || registered.contains(&answer) || answer.contains(&registered)
}
