//! Event classification and weapons.

use super::patterns::KeywordMatcher;

/// Label of the first event keyword present, by priority. Every record
/// describes some activity, so the fallback label is always returned when
/// nothing matches.
pub fn event(text: &str, keywords: &[KeywordMatcher], fallback: &str) -> String {
    keywords
        .iter()
        .find(|k| k.is_match(text))
        .map_or_else(|| fallback.to_string(), |k| k.label.clone())
}

/// Canonical weapon names found in the text, deduplicated, sorted, and
/// joined with `", "`.
pub fn weapons(text: &str, keywords: &[KeywordMatcher]) -> Option<String> {
    let mut found: Vec<&str> = keywords
        .iter()
        .filter(|k| k.is_match(text))
        .map(|k| k.label.as_str())
        .collect();
    if found.is_empty() {
        return None;
    }
    found.sort_unstable();
    found.dedup();
    Some(found.join(", "))
}
