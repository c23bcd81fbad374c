use std::sync::LazyLock;

use regex::Regex;

use super::RecordBlock;

/// Numbered-list anchor at the start of a line: `1. `, ` 12.`.
static LINE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,2})\.(?:\s|$)").expect("valid regex"));

/// A line that is only a faction/group label, e.g. `ULFA`.
static CONTEXT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3,6}$").expect("valid regex"));

fn anchor_serial(line: &str) -> Option<u32> {
    LINE_ANCHOR.captures(line).and_then(|c| c[1].parse().ok())
}

fn is_context_header(line: &str) -> bool {
    CONTEXT_HEADER.is_match(line.trim())
}

struct OpenSpan {
    serial: Option<u32>,
    lines: Vec<String>,
    context: Option<String>,
}

impl OpenSpan {
    fn finish(self) -> RecordBlock {
        RecordBlock::text_block(self.serial, self.lines.join("\n").trim().to_string(), self.context)
    }
}

/// Split flat text into one block per numbered anchor.
///
/// A block runs from its anchor line to the line before the next anchor.
/// Lines consisting only of 3–6 capital letters are not content: they set the
/// context for every block that starts after them, until the next such line.
/// Text before the first anchor is preamble and is discarded; a text with no
/// anchors at all becomes a single block.
pub fn segment_narrative(lines: &[String]) -> Vec<RecordBlock> {
    let mut blocks = Vec::new();
    let mut context: Option<String> = None;
    let mut first_context: Option<String> = None;
    let mut open: Option<OpenSpan> = None;
    let mut preamble: Vec<String> = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        if is_context_header(line) {
            let header = line.trim().to_string();
            tracing::debug!(header = %header, "Context header");
            if first_context.is_none() {
                first_context = Some(header.clone());
            }
            context = Some(header);
            continue;
        }

        if let Some(serial) = anchor_serial(line) {
            if let Some(done) = open.take() {
                blocks.push(done.finish());
            }
            open = Some(OpenSpan {
                serial: Some(serial),
                lines: vec![line.trim_end().to_string()],
                context: context.clone(),
            });
            continue;
        }

        match open.as_mut() {
            Some(span) => span.lines.push(line.trim_end().to_string()),
            None => preamble.push(line.trim_end().to_string()),
        }
    }

    if let Some(done) = open.take() {
        blocks.push(done.finish());
    }

    if blocks.is_empty() && !preamble.is_empty() {
        tracing::info!("No numbered anchors found, treating text as a single record");
        let span = OpenSpan {
            serial: None,
            lines: preamble,
            context: first_context,
        };
        return vec![span.finish()];
    }

    tracing::info!(records = blocks.len(), "Narrative segmentation complete");
    blocks
}
