//! Who was involved: formation type, armed group, and leader.

use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{ranked_name, KeywordMatcher, NAME, RANK};

/// First formation keyword present in the text, by table priority.
pub fn formation(text: &str, keywords: &[KeywordMatcher]) -> Option<String> {
    keywords
        .iter()
        .find(|k| k.is_match(text))
        .map(|k| k.label.clone())
}

// ──────────────────────────────────────────────
// Group / faction
// ──────────────────────────────────────────────

/// Group code with an optional faction suffix: `ULFA`, `NSCN(IM)`, `PLA (M)`.
const GROUP: &str = r"([A-Z][A-Z0-9]{2,5}(?:\s?\([A-Z0-9/\-]{1,8}\))?)";

/// Contextual templates, tried in order.
static GROUP_TEMPLATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"\b{GROUP}\s+(?i:cadres?)\b"),
        format!(r"(?i:\bcadres?\s+of)\s+{GROUP}"),
        format!(r"\b{GROUP}\s+COB\b"),
        format!(r"\b{GROUP}\s+(?i:camp)\b"),
        format!(r"\b{GROUP}\s+is\s+plg\b"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Armed group named in the text, else the carried-forward header.
pub fn group(text: &str, context: Option<&str>) -> Option<String> {
    GROUP_TEMPLATES
        .iter()
        .find_map(|re| re.captures(text).map(|c| c[1].to_string()))
        .or_else(|| context.map(str::to_string))
}

// ──────────────────────────────────────────────
// Leader
// ──────────────────────────────────────────────

/// Leader templates in priority order. The first template that matches wins.
static LEADER_TEMPLATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let ranked = ranked_name();
    [
        format!(r"(?i:\bled\s+by)\s+({ranked})"),
        format!(r"(?i:\bchaired\s+by)\s+({ranked})"),
        format!(r"(?i:\bheaded\s+by)\s+({ranked})"),
        format!(r"(?i:\bnamed)\s+((?:[A-Z]{{1,3}}\s+)?(?:{RANK}\.?\s+)?{NAME})"),
        format!(
            r"\b((?:SS\s+)?(?:Lt\s+Gen|Maj\s+Gen|Lt\s+Col|Sgt\s+Maj|Brig|Col|Maj|Capt|Sgt)\.?\s+{NAME})"
        ),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Leader named in the text.
pub fn leader(text: &str) -> Option<String> {
    LEADER_TEMPLATES
        .iter()
        .find_map(|re| re.captures(text).map(|c| c[1].trim().to_string()))
}
