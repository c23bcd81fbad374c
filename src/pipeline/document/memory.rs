//! In-memory [`RawDocument`] for content already produced by a conversion
//! backend, plus loaders for the two on-disk interchange formats.

use std::path::Path;

use serde::Deserialize;

use super::types::{Grid, RawDocument};
use super::DocumentError;

/// A document whose text lines and tables are held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    lines: Vec<String>,
    tables: Vec<Grid>,
}

/// JSON interchange shape: `{"text": [...], "tables": [[[...]]]}`.
/// `text` may also be a single string.
#[derive(Deserialize)]
struct DocumentJson {
    #[serde(default)]
    text: TextJson,
    #[serde(default)]
    tables: Vec<Grid>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextJson {
    Lines(Vec<String>),
    Flat(String),
}

impl Default for TextJson {
    fn default() -> Self {
        Self::Lines(Vec::new())
    }
}

impl MemoryDocument {
    pub fn new(lines: Vec<String>, tables: Vec<Grid>) -> Self {
        Self { lines, tables }
    }

    /// Narrative-only document from a flat text stream.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
            tables: Vec::new(),
        }
    }

    /// Document with tables and the flat text the backend read alongside them.
    pub fn from_tables(tables: Vec<Grid>, text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
            tables,
        }
    }

    /// Parse the JSON interchange format.
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        let raw: DocumentJson = serde_json::from_str(json)?;
        let lines = match raw.text {
            TextJson::Lines(lines) => lines,
            TextJson::Flat(text) => text.lines().map(str::to_string).collect(),
        };
        Ok(Self::new(lines, raw.tables))
    }

    /// Load from disk: `.txt`/`.md` as flat text, `.json` as the interchange format.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "txt" | "md" => {
                let text = std::fs::read_to_string(path)?;
                Ok(Self::from_text(&text))
            }
            "json" => {
                let json = std::fs::read_to_string(path)?;
                Self::from_json_str(&json)
            }
            _ => Err(DocumentError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl RawDocument for MemoryDocument {
    fn get_text(&self) -> Result<Vec<String>, DocumentError> {
        Ok(self.lines.clone())
    }

    fn get_tables(&self) -> Result<Vec<Grid>, DocumentError> {
        Ok(self.tables.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_splits_lines() {
        let doc = MemoryDocument::from_text("1. First\n2. Second");
        assert_eq!(doc.get_text().unwrap(), vec!["1. First", "2. Second"]);
        assert!(doc.get_tables().unwrap().is_empty());
        assert_eq!(doc.probe_first_page_tables().unwrap(), 0);
    }

    #[test]
    fn json_accepts_line_array_and_tables() {
        let doc = MemoryDocument::from_json_str(
            r#"{"text": ["a", "b"], "tables": [[["S No", "Input"], ["1.", "x"]]]}"#,
        )
        .unwrap();
        assert_eq!(doc.get_text().unwrap().len(), 2);
        let tables = doc.get_tables().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][1][0], "1.");
    }

    #[test]
    fn json_accepts_flat_text_and_missing_tables() {
        let doc = MemoryDocument::from_json_str(r#"{"text": "line one\nline two"}"#).unwrap();
        assert_eq!(doc.get_text().unwrap(), vec!["line one", "line two"]);
        assert!(doc.get_tables().unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let result = MemoryDocument::from_json_str("{not json");
        assert!(matches!(result, Err(DocumentError::InvalidJson(_))));
    }

    #[test]
    fn load_reads_text_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        std::fs::write(&path, "1. Something happened.\n").unwrap();
        let doc = MemoryDocument::load(&path).unwrap();
        assert_eq!(doc.get_text().unwrap(), vec!["1. Something happened."]);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        assert!(matches!(
            MemoryDocument::load(&path),
            Err(DocumentError::UnsupportedFormat(_))
        ));
    }
}
