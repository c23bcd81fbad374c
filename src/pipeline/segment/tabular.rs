use std::sync::LazyLock;

use regex::Regex;

use super::{RecordBlock, TableCell};
use crate::pipeline::document::{cell, Grid};

/// A row starts a new record when its first cell is a bare serial number.
static SERIAL_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.$").expect("valid regex"));

/// Parse a first cell as a serial anchor (`"12."` → 12).
fn serial_of(first_cell: &str) -> Option<u32> {
    SERIAL_ANCHOR
        .captures(first_cell.trim())
        .and_then(|c| c[1].parse().ok())
}

/// Label for column `index`, falling back to a positional name.
fn label_at(header: &[String], index: usize) -> String {
    let label = cell(header, index).trim();
    if label.is_empty() {
        format!("Column {}", index + 1)
    } else {
        label.to_string()
    }
}

/// Whether a grid's leading row should replace the header in force.
///
/// A table continued onto a new page may open with a continuation row
/// instead of a repeated header; such rows have a blank serial column.
fn starts_with_header(first: &[String], header: &[String], has_open: bool) -> bool {
    if serial_of(cell(first, 0)).is_some() {
        return false;
    }
    if header.is_empty() || !has_open {
        return true;
    }
    let repeated = first.iter().map(|c| c.trim()).eq(header.iter().map(String::as_str));
    repeated || !cell(first, 0).trim().is_empty()
}

/// Row being assembled from an anchor row plus its continuation rows.
struct OpenRow {
    serial: u32,
    cells: Vec<TableCell>,
}

impl OpenRow {
    fn start(serial: u32, header: &[String], row: &[String]) -> Self {
        let width = header.len().max(row.len());
        let cells = (0..width)
            .map(|i| TableCell {
                label: label_at(header, i),
                value: cell(row, i).trim().to_string(),
            })
            .collect();
        Self { serial, cells }
    }

    /// Append a continuation row's non-empty cells onto the matching columns.
    fn absorb(&mut self, header: &[String], row: &[String]) {
        for (i, raw) in row.iter().enumerate() {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }
            if i >= self.cells.len() {
                self.cells.push(TableCell {
                    label: label_at(header, i),
                    value: String::new(),
                });
            }
            let target = &mut self.cells[i].value;
            if target.is_empty() {
                target.push_str(value);
            } else {
                target.push(' ');
                target.push_str(value);
            }
        }
    }

    fn finish(self) -> RecordBlock {
        RecordBlock::row_block(Some(self.serial), self.cells)
    }
}

/// Merge grid rows into one block per serial-numbered record.
///
/// The first grid's leading row is the header. A later grid's leading row
/// replaces it only when no record is open, when it repeats the header, or
/// when its serial column holds a label; an anchored or blank-serial leading
/// row keeps the previous header in force. Rows without an anchor
/// extend the open record; a continuation before any anchor is dropped.
/// The open record carries across grid boundaries.
pub fn segment_tables(grids: &[Grid]) -> Vec<RecordBlock> {
    let mut blocks = Vec::new();
    let mut header: Vec<String> = Vec::new();
    let mut open: Option<OpenRow> = None;
    let mut orphans = 0usize;

    for grid in grids {
        let mut rows = grid.iter();

        if let Some(first) = grid.first() {
            if starts_with_header(first, &header, open.is_some()) {
                header = first.iter().map(|c| c.trim().to_string()).collect();
                rows.next();
            }
        }

        for row in rows {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            match serial_of(cell(row, 0)) {
                Some(serial) => {
                    if let Some(done) = open.take() {
                        blocks.push(done.finish());
                    }
                    open = Some(OpenRow::start(serial, &header, row));
                }
                None => match open.as_mut() {
                    Some(current) => current.absorb(&header, row),
                    None => orphans += 1,
                },
            }
        }
    }

    if let Some(done) = open.take() {
        blocks.push(done.finish());
    }

    if orphans > 0 {
        tracing::debug!(orphans, "Dropped continuation rows before the first anchor");
    }
    tracing::info!(rows = blocks.len(), tables = grids.len(), "Tabular segmentation complete");
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::segment::BlockContent;

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn cells(block: &RecordBlock) -> &[TableCell] {
        match &block.content {
            BlockContent::Row(cells) => cells,
            BlockContent::Text(_) => panic!("expected a row block"),
        }
    }

    #[test]
    fn serial_anchor_detection() {
        assert_eq!(serial_of("1."), Some(1));
        assert_eq!(serial_of(" 12. "), Some(12));
        assert_eq!(serial_of("1"), None);
        assert_eq!(serial_of("1.a"), None);
        assert_eq!(serial_of("S No"), None);
    }

    #[test]
    fn anchored_rows_become_blocks_in_order() {
        let g = grid(&[
            &["S No", "Date", "Input"],
            &["1.", "15-Jan-24", "First incident"],
            &["2.", "16-Jan-24", "Second incident"],
        ]);
        let blocks = segment_tables(&[g]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].serial, Some(1));
        assert_eq!(blocks[1].serial, Some(2));
        assert_eq!(cells(&blocks[0])[2].label, "Input");
        assert_eq!(cells(&blocks[0])[2].value, "First incident");
    }

    #[test]
    fn continuation_rows_append_not_overwrite() {
        let g = grid(&[
            &["S No", "Date", "Input"],
            &["1.", "15-Jan-24", "Cadres of NSCN"],
            &["", "", "seen near Mon."],
            &["", "0600h", ""],
        ]);
        let blocks = segment_tables(&[g]);
        assert_eq!(blocks.len(), 1);
        let c = cells(&blocks[0]);
        assert_eq!(c[2].value, "Cadres of NSCN seen near Mon.");
        assert_eq!(c[1].value, "15-Jan-24 0600h");
    }

    #[test]
    fn continuation_fills_empty_cell_directly() {
        let g = grid(&[
            &["S No", "Date", "Input"],
            &["1.", "", "Text"],
            &["", "15-Jan-24", ""],
        ]);
        let blocks = segment_tables(&[g]);
        assert_eq!(cells(&blocks[0])[1].value, "15-Jan-24");
    }

    #[test]
    fn continuation_before_first_anchor_is_dropped() {
        let g = grid(&[
            &["S No", "Input"],
            &["", "stray text"],
            &["1.", "Real record"],
        ]);
        let blocks = segment_tables(&[g]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(cells(&blocks[0])[1].value, "Real record");
    }

    #[test]
    fn open_record_continues_across_grids() {
        let page1 = grid(&[&["S No", "Input"], &["1.", "Starts on page one"]]);
        let page2 = grid(&[&["", "and ends on page two"], &["2.", "Next"]]);
        let blocks = segment_tables(&[page1, page2]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(cells(&blocks[0])[1].value, "Starts on page one and ends on page two");
        assert_eq!(cells(&blocks[1])[1].label, "Input");
    }

    #[test]
    fn page_break_continuation_keeps_previous_header() {
        let page1 = grid(&[
            &["S No", "Date", "Input"],
            &["1.", "15-Jan-24", "Cadres of NSCN seen"],
        ]);
        let page2 = grid(&[
            &["", "", "near Mon with 2 x AK-47."],
            &["2.", "16-Jan-24", "Second incident"],
        ]);
        let blocks = segment_tables(&[page1, page2]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(cells(&blocks[0])[2].value, "Cadres of NSCN seen near Mon with 2 x AK-47.");
        let second = cells(&blocks[1]);
        assert_eq!(second[0].label, "S No");
        assert_eq!(second[1].label, "Date");
        assert_eq!(second[2].label, "Input");
    }

    #[test]
    fn repeated_header_on_new_page_is_not_content() {
        let page1 = grid(&[&["S No", "Input"], &["1.", "First"]]);
        let page2 = grid(&[&["S No", "Input"], &["2.", "Second"]]);
        let blocks = segment_tables(&[page1, page2]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(cells(&blocks[0])[1].value, "First");
        assert_eq!(cells(&blocks[1])[1].value, "Second");
    }

    #[test]
    fn ragged_rows_and_blank_header_labels() {
        let g = grid(&[&["S No", ""], &["1.", "text", "extra"]]);
        let blocks = segment_tables(&[g]);
        let c = cells(&blocks[0]);
        assert_eq!(c.len(), 3);
        assert_eq!(c[1].label, "Column 2");
        assert_eq!(c[2].label, "Column 3");
        assert_eq!(c[2].value, "extra");
    }

    #[test]
    fn header_only_grid_yields_nothing() {
        let g = grid(&[&["S No", "Date", "Input"]]);
        assert!(segment_tables(&[g]).is_empty());
    }
}
