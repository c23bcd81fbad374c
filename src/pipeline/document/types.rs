use serde::{Deserialize, Serialize};

use super::DocumentError;

/// One table as extracted by the conversion backend: rows of cells.
/// Rows may be ragged; a missing cell reads as an empty string.
pub type Grid = Vec<Vec<String>>;

/// Whether a document is laid out as a table of incidents or as numbered prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Tabular,
    Narrative,
}

impl std::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tabular => write!(f, "tabular"),
            Self::Narrative => write!(f, "narrative"),
        }
    }
}

/// Read-only view of a converted source document.
///
/// Implementations wrap whatever conversion backend produced the content.
/// The pipeline borrows the document for the duration of one run.
pub trait RawDocument: Send + Sync {
    /// The document's text, one entry per line, in reading order.
    fn get_text(&self) -> Result<Vec<String>, DocumentError>;

    /// All tables in the document, in reading order.
    fn get_tables(&self) -> Result<Vec<Grid>, DocumentError>;

    /// Lattice-style table probe on the first page.
    ///
    /// Returns the number of ruled tables found. The default implementation
    /// counts the tables the backend reports for the whole document, which is
    /// enough for backends that cannot address single pages.
    fn probe_first_page_tables(&self) -> Result<usize, DocumentError> {
        Ok(self.get_tables()?.len())
    }
}

/// Fetch a cell from a ragged row, treating missing cells as empty.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
