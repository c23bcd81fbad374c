//! Lenient parsing of the service reply into a record.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::EnrichmentError;
use crate::models::{ExtractedRecord, FieldValue, COLUMNS};

/// Reasoning preamble emitted by some models before the answer.
static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid regex"));

/// Strings models use to mean "no value".
const PLACEHOLDERS: &[&str] = &["", "null", "n/a", "na", "none", "nil", "-", "unknown"];

/// Remove `<think>…</think>` blocks. A dangling `</think>` (open tag cut off)
/// drops everything before it.
pub fn strip_reasoning(raw: &str) -> String {
    let cleaned = THINK_BLOCK.replace_all(raw, "");
    match cleaned.rfind("</think>") {
        Some(pos) => cleaned[pos + "</think>".len()..].to_string(),
        None => cleaned.into_owned(),
    }
}

/// Slice from the first `{` to the last `}`.
pub fn locate_payload(text: &str) -> Result<&str, EnrichmentError> {
    if text.trim().is_empty() {
        return Err(EnrichmentError::EmptyResponse);
    }
    let start = text.find('{').ok_or(EnrichmentError::NoPayload)?;
    let end = text.rfind('}').ok_or(EnrichmentError::NoPayload)?;
    if end < start {
        return Err(EnrichmentError::NoPayload);
    }
    Ok(&text[start..=end])
}

/// Parse a raw reply into a record. Unknown keys are ignored; values of the
/// wrong shape become `None` rather than failing the whole payload.
pub fn parse_payload(raw: &str) -> Result<ExtractedRecord, EnrichmentError> {
    let cleaned = strip_reasoning(raw);
    let payload = locate_payload(&cleaned)?;
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| EnrichmentError::MalformedPayload(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(EnrichmentError::MalformedPayload("payload is not an object".into()));
    };

    let mut record = ExtractedRecord::new();
    for column in COLUMNS {
        if let Some(v) = map.get(column.key()) {
            record.set(column, field_value(v));
        }
    }
    Ok(record)
}

fn field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::String(s) => text_value(s),
        Value::Number(n) => match n.as_u64().and_then(|v| u32::try_from(v).ok()) {
            Some(count) => Some(FieldValue::Count(count)),
            None => Some(FieldValue::Text(n.to_string())),
        },
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match field_value(item)? {
                    FieldValue::Text(s) => Some(s),
                    FieldValue::Count(n) => Some(n.to_string()),
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(FieldValue::Text(parts.join(", ")))
            }
        }
        Value::Null | Value::Bool(_) | Value::Object(_) => None,
    }
}

fn text_value(s: &str) -> Option<FieldValue> {
    let trimmed = s.trim();
    if PLACEHOLDERS.iter().any(|p| trimmed.eq_ignore_ascii_case(p)) {
        None
    } else {
        Some(FieldValue::Text(trimmed.to_string()))
    }
}
