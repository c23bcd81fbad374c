//! Source document access and structure classification.
//!
//! The document-to-text conversion itself is an external collaborator; this
//! module only sees its output through [`RawDocument`]: a flat list of text
//! lines and a list of cell grids.

pub mod types;
pub mod memory;
pub mod classify;

pub use types::*;
pub use memory::MemoryDocument;
pub use classify::classify;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table probe failed: {0}")]
    TableProbe(String),

    #[error("Text extraction failed: {0}")]
    TextExtraction(String),

    #[error("Invalid document JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(PathBuf),
}
