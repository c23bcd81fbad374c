//! Pipeline diagnostic dump: writes intermediate artifacts to disk.
//!
//! Enables inspection of every stage of one run: detected structure, segmented
//! blocks, raw rule output, final merged records.
//!
//! **Activation**: disabled unless `debug_dump_dir` is set in the config (or
//! `SITREP_DUMP_DIR` in the environment).
//!
//! **Output structure**:
//! ```text
//! {dump_dir}/{run_id}/
//!   00-structure.json
//!   01-blocks.md
//!   02-rule-records.json
//!   03-final-records.json
//! ```
//!
//! Dump failures are logged and never fail the run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use super::segment::RecordBlock;

/// Files written for one run, in stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Structure,
    Blocks,
    RuleRecords,
    FinalRecords,
}

impl Artifact {
    pub const ALL: [Artifact; 4] = [
        Artifact::Structure,
        Artifact::Blocks,
        Artifact::RuleRecords,
        Artifact::FinalRecords,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Structure => "00-structure.json",
            Self::Blocks => "01-blocks.md",
            Self::RuleRecords => "02-rule-records.json",
            Self::FinalRecords => "03-final-records.json",
        }
    }
}

/// Dump target for a single run: `{base}/{run_id}/`.
#[derive(Debug, Clone)]
pub struct RunDump {
    dir: PathBuf,
}

impl RunDump {
    /// `None` when no base directory is configured or the run directory
    /// cannot be created.
    pub fn open(base: Option<&Path>, run_id: &Uuid) -> Option<Self> {
        let dir = base?.join(run_id.to_string());
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!(path = %dir.display(), error = %e, "Run dump disabled: cannot create directory");
            return None;
        }
        Some(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pretty-printed JSON for a structure or record artifact.
    pub fn json<T: Serialize>(&self, artifact: Artifact, value: &T) {
        self.write(artifact, serde_json::to_string_pretty(value));
    }

    pub fn blocks(&self, blocks: &[RecordBlock]) {
        self.write(Artifact::Blocks, Ok(render_blocks(blocks)));
    }

    fn write(&self, artifact: Artifact, rendered: serde_json::Result<String>) {
        let file = artifact.file_name();
        let contents = match rendered {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(file, error = %e, "Run dump skipped: artifact not serializable");
                return;
            }
        };
        match std::fs::write(self.dir.join(file), contents.as_bytes()) {
            Ok(()) => tracing::debug!(file, bytes = contents.len(), "Run artifact dumped"),
            Err(e) => tracing::warn!(file, error = %e, "Run dump skipped: write failed"),
        }
    }
}

/// Blocks as Markdown sections separated by `---`.
pub fn render_blocks(blocks: &[RecordBlock]) -> String {
    blocks
        .iter()
        .map(|b| {
            let serial = b.serial.map_or_else(|| "-".to_string(), |s| s.to_string());
            let context = b.context.as_deref().unwrap_or("-");
            format!(
                "## Block {} (serial {serial}, context {context})\n\n{}\n",
                b.index,
                b.text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n\n")
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_records() -> Vec<crate::models::ExtractedRecord> {
        let mut rec = crate::models::ExtractedRecord::new();
        rec.state = Some("Nagaland".into());
        rec.cadres_max = Some(4);
        vec![rec]
    }

    #[test]
    fn open_creates_run_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let run_id = Uuid::new_v4();
        let dump = RunDump::open(Some(tmp.path()), &run_id).unwrap();

        assert!(dump.dir().exists());
        assert!(dump.dir().ends_with(run_id.to_string()));
    }

    #[test]
    fn open_is_disabled_without_base() {
        assert!(RunDump::open(None, &Uuid::new_v4()).is_none());
    }

    #[test]
    fn records_are_dumped_as_pretty_json() {
        let tmp = tempfile::tempdir().unwrap();
        let dump = RunDump::open(Some(tmp.path()), &Uuid::new_v4()).unwrap();

        dump.json(Artifact::RuleRecords, &make_records());

        let path = dump.dir().join(Artifact::RuleRecords.file_name());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\"state\": \"Nagaland\""));
        assert!(content.contains("\"cadres_max\": 4"));
    }

    #[test]
    fn blocks_artifact_holds_rendered_markdown() {
        let tmp = tempfile::tempdir().unwrap();
        let dump = RunDump::open(Some(tmp.path()), &Uuid::new_v4()).unwrap();
        let blocks = vec![RecordBlock::text_block(Some(1), "1. First".into(), None)];

        dump.blocks(&blocks);

        let content = std::fs::read_to_string(dump.dir().join(Artifact::Blocks.file_name())).unwrap();
        assert_eq!(content, render_blocks(&blocks));
    }

    #[test]
    fn write_failures_do_not_panic() {
        let dump = RunDump {
            dir: PathBuf::from("/nonexistent/path/that/does/not/exist"),
        };
        dump.json(Artifact::Structure, &"data");
        dump.blocks(&[]);
    }

    #[test]
    fn file_names_follow_stage_order() {
        let names: Vec<&str> = Artifact::ALL.iter().map(|a| a.file_name()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn blocks_render_with_separators() {
        let blocks = vec![
            RecordBlock::text_block(Some(1), "1. First".into(), Some("ULFA".into())),
            RecordBlock::text_block(Some(2), "2. Second".into(), None),
        ];
        let md = render_blocks(&blocks);
        assert!(md.contains("serial 1, context ULFA"));
        assert!(md.contains("\n---\n"));
        assert!(md.contains("2. Second"));
    }
}
