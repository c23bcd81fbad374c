use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{collapse_whitespace, truncate_chars};

/// Heading length cap for the output sheet.
pub const MAX_HEADING_CHARS: usize = 150;

/// Summary length cap for the output sheet.
pub const MAX_SUMMARY_CHARS: usize = 800;

/// Sentences after the heading that make up the summary.
const SUMMARY_SENTENCES: usize = 3;

static ENUMERATION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s*").expect("valid regex"));

/// Split on a period followed by whitespace; the period stays with its sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '.' {
            continue;
        }
        if let Some(&(next_i, next_c)) = chars.peek() {
            if next_c.is_whitespace() {
                let sentence = text[start..=i].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = next_i;
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Split a block into a heading and a short summary.
///
/// The enumeration prefix is stripped. The heading is the first sentence
/// without its period; the summary is the next three sentences, or the whole
/// text when there is nothing after the heading.
pub fn heading_and_summary(text: &str) -> (Option<String>, Option<String>) {
    let flat = collapse_whitespace(text);
    let clean = ENUMERATION_PREFIX.replace(&flat, "").trim().to_string();
    if clean.is_empty() {
        return (None, None);
    }

    let sentences = split_sentences(&clean);
    let heading = sentences
        .first()
        .map(|s| s.strip_suffix('.').unwrap_or(s).trim())
        .filter(|s| !s.is_empty())
        .map(|s| truncate_chars(s, MAX_HEADING_CHARS));

    let rest: Vec<&str> = sentences.iter().skip(1).take(SUMMARY_SENTENCES).copied().collect();
    let summary = if rest.is_empty() {
        clean.clone()
    } else {
        rest.join(" ")
    };

    (heading, Some(truncate_chars(&summary, MAX_SUMMARY_CHARS)))
}
