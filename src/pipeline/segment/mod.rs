//! Record segmentation: split classified content into one block per incident.
//!
//! Two strategies, picked by [`StructureKind`](crate::pipeline::document::StructureKind):
//! - [`segment_tables`] walks grid rows, merging continuation rows into the
//!   last anchored row.
//! - [`segment_narrative`] cuts flat text at numbered-list anchors and carries
//!   faction header lines forward as context.
//!
//! Both emit blocks in document order; [`drop_noise`] then removes blocks too
//! short to be an incident.

pub mod narrative;
pub mod tabular;

pub use narrative::segment_narrative;
pub use tabular::segment_tables;

use serde::Serialize;

/// Default minimum significant characters for a block to be kept.
pub const DEFAULT_MIN_BLOCK_CHARS: usize = 50;

/// One labeled cell of a merged table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub label: String,
    pub value: String,
}

/// Raw content of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockContent {
    /// A merged table row, cells in column order.
    Row(Vec<TableCell>),
    /// A narrative span starting at its anchor line.
    Text(String),
}

/// A contiguous unit of source content describing at most one incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordBlock {
    /// Position in the emitted block sequence.
    pub index: usize,
    /// Serial number from the block's anchor, if it had one.
    pub serial: Option<u32>,
    pub content: BlockContent,
    /// Faction header carried forward from earlier in the document.
    pub context: Option<String>,
}

impl RecordBlock {
    pub fn text_block(serial: Option<u32>, text: String, context: Option<String>) -> Self {
        Self {
            index: 0,
            serial,
            content: BlockContent::Text(text),
            context,
        }
    }

    pub fn row_block(serial: Option<u32>, cells: Vec<TableCell>) -> Self {
        Self {
            index: 0,
            serial,
            content: BlockContent::Row(cells),
            context: None,
        }
    }

    /// Full text used by the field extractors.
    ///
    /// Rows render as `Label: value` lines, skipping empty cells.
    pub fn text(&self) -> String {
        match &self.content {
            BlockContent::Text(text) => text.clone(),
            BlockContent::Row(cells) => cells
                .iter()
                .filter(|c| !c.value.trim().is_empty())
                .map(|c| format!("{}: {}", c.label, c.value.trim()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Prose body used for the heading/summary split.
    ///
    /// For rows this is the longest cell, which is the narrative column in
    /// every report layout seen so far.
    pub fn body(&self) -> String {
        match &self.content {
            BlockContent::Text(text) => text.clone(),
            BlockContent::Row(cells) => cells
                .iter()
                .map(|c| c.value.trim())
                .max_by_key(|v| v.chars().count())
                .unwrap_or("")
                .to_string(),
        }
    }

    /// Characters that carry content (labels and surrounding whitespace excluded).
    pub fn significant_len(&self) -> usize {
        match &self.content {
            BlockContent::Text(text) => text.trim().chars().count(),
            BlockContent::Row(cells) => {
                let values: Vec<&str> = cells
                    .iter()
                    .map(|c| c.value.trim())
                    .filter(|v| !v.is_empty())
                    .collect();
                values.join(" ").chars().count()
            }
        }
    }
}

/// Drop blocks below `min_chars` significant characters and renumber the rest.
///
/// Returns the kept blocks (indexed `0..n` in document order) and the number dropped.
pub fn drop_noise(blocks: Vec<RecordBlock>, min_chars: usize) -> (Vec<RecordBlock>, usize) {
    let total = blocks.len();
    let kept: Vec<RecordBlock> = blocks
        .into_iter()
        .filter(|b| {
            let keep = b.significant_len() >= min_chars;
            if !keep {
                tracing::debug!(serial = ?b.serial, chars = b.significant_len(), "Dropping noise block");
            }
            keep
        })
        .enumerate()
        .map(|(i, mut b)| {
            b.index = i;
            b
        })
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}
