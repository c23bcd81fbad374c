//! Stateless pattern helpers shared by the field extractors: dates, keyword
//! matchers, rank-prefixed names, and char-safe truncation.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::RuleError;

// ──────────────────────────────────────────────
// Dates
// ──────────────────────────────────────────────

/// `15-Jan-24`, `15 Jan 2024`, `3-Sept-23`.
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[-\s/]([A-Za-z]{3,4})[-\s/]\s?(\d{4}|\d{2})\b").expect("valid regex")
});

/// Find the first calendar-valid date and return it as written.
///
/// The month token is checked against real month abbreviations, so a match
/// like `12 abc 24` is skipped rather than reported.
pub fn find_date(text: &str) -> Option<String> {
    DATE.captures_iter(text).find_map(|caps| {
        let day = &caps[1];
        let month = caps[2].get(..3)?;
        let year = &caps[3];
        let normalized = format!("{day}-{month}-{year}");
        let format = if year.len() == 4 { "%d-%b-%Y" } else { "%d-%b-%y" };
        NaiveDate::parse_from_str(&normalized, format)
            .ok()
            .map(|_| caps[0].to_string())
    })
}

// ──────────────────────────────────────────────
// Keyword matchers
// ──────────────────────────────────────────────

/// A compiled keyword test with the label it yields.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    regex: Regex,
    pub label: String,
}

impl KeywordMatcher {
    /// Case-insensitive match anchored at a word start. With `whole_word`
    /// the keyword must also end at a word boundary (`post` does not match
    /// `posted`); without it, `gren` matches `grenades`.
    pub fn compile(keyword: &str, label: &str, whole_word: bool) -> Result<Self, RuleError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(RuleError::EmptyKeyword(label.to_string()));
        }
        let mut pattern = String::from("(?i)");
        if keyword.starts_with(|c: char| c.is_alphanumeric()) {
            pattern.push_str(r"\b");
        }
        pattern.push_str(&regex::escape(keyword));
        if whole_word && keyword.ends_with(|c: char| c.is_alphanumeric()) {
            pattern.push_str(r"\b");
        }
        let regex = Regex::new(&pattern).map_err(|e| RuleError::InvalidPattern {
            keyword: keyword.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            regex,
            label: label.to_string(),
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Exact, case-sensitive whole-token match for short codes such as `J&K`.
pub fn compile_token(token: &str) -> Result<Regex, RuleError> {
    let pattern = format!(
        r"(?:^|[^A-Za-z0-9&]){}(?:[^A-Za-z0-9&]|$)",
        regex::escape(token.trim())
    );
    Regex::new(&pattern).map_err(|e| RuleError::InvalidPattern {
        keyword: token.to_string(),
        reason: e.to_string(),
    })
}

// ──────────────────────────────────────────────
// Names
// ──────────────────────────────────────────────

/// Ranks and titles that prefix a leader's name, longest first.
pub const RANK: &str = r"(?:Lt\s+Gen|Maj\s+Gen|Lt\s+Col|Sgt\s+Maj|Brig|Col|Maj|Capt|Lt|Sgt|Gen|Cdr|Chairman|President)";

/// Capitalised personal name of one to four words.
pub const NAME: &str = r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,3}";

/// `SS Col Tom Wangsu`, `Capt Ningthou`.
pub fn ranked_name() -> String {
    format!(r"(?:SS\s+)?{RANK}\.?\s+{NAME}")
}

// ──────────────────────────────────────────────
// Text helpers
// ──────────────────────────────────────────────

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte, _)) => text[..byte].to_string(),
        None => text.to_string(),
    }
}

/// Collapse every whitespace run (including newlines) to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim and map empty strings to `None`.
pub fn non_empty(text: &str) -> Option<String> {
    let t = text.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
