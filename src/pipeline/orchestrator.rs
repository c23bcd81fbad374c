//! End-to-end extraction for one document:
//! classify → segment → rule-extract → (enrich → merge) → emit.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::batch::map_ordered;
use super::diagnostic::{Artifact, RunDump};
use super::document::{classify, DocumentError, RawDocument, StructureKind};
use super::enrichment::{merge, Enricher, EnrichmentError, EnrichmentResult, LlmClient, OllamaClient};
use super::rules::RuleEngine;
use super::segment::{drop_noise, segment_narrative, segment_tables, RecordBlock};
use crate::config::{ConfigError, PipelineConfig};
use crate::models::{Column, ExtractedRecord, COLUMNS};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Document yielded no usable text or table content")]
    NoContent,

    #[error("Document text could not be read: {0}")]
    NoReadableText(#[source] DocumentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Enrichment client setup failed: {0}")]
    EnrichmentSetup(#[from] EnrichmentError),
}

/// Per-document state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Received,
    Classified,
    Segmented,
    Extracted,
    Enriched,
    Emitted,
    Failed,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Classified => "classified",
            Self::Segmented => "segmented",
            Self::Extracted => "extracted",
            Self::Enriched => "enriched",
            Self::Emitted => "emitted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub run_id: Uuid,
    /// Structure actually used for segmentation (after re-validation).
    pub structure: StructureKind,
    /// Records in document order.
    pub records: Vec<ExtractedRecord>,
    /// Blocks dropped as noise.
    pub dropped: usize,
    /// Blocks lost to an unexpected failure during rule extraction.
    pub failed: usize,
    /// Records whose enrichment fell back.
    pub enrichment_degraded: usize,
}

impl PipelineOutput {
    /// Presentation order for the renderer.
    pub fn columns(&self) -> &'static [Column] {
        &COLUMNS
    }
}

#[derive(Serialize)]
struct StructureDump<'a> {
    run_id: &'a Uuid,
    classified: StructureKind,
    segmented_as: StructureKind,
    blocks: usize,
    dropped: usize,
}

pub struct ExtractionPipeline {
    config: PipelineConfig,
    engine: RuleEngine,
    client: Option<Arc<dyn LlmClient>>,
}

impl ExtractionPipeline {
    /// Build from config. An Ollama client is created only when enrichment
    /// is enabled.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let client: Option<Arc<dyn LlmClient>> = if config.enrichment.mode.is_enabled() {
            let e = &config.enrichment;
            Some(Arc::new(OllamaClient::new(&e.base_url, e.timeout())?))
        } else {
            None
        };
        Self::build(config, client)
    }

    /// Build with a caller-supplied enrichment client.
    pub fn with_client(config: PipelineConfig, client: Arc<dyn LlmClient>) -> Result<Self, PipelineError> {
        Self::build(config, Some(client))
    }

    fn build(config: PipelineConfig, client: Option<Arc<dyn LlmClient>>) -> Result<Self, PipelineError> {
        config.validate()?;
        let engine = RuleEngine::new(&config.rules).map_err(ConfigError::from)?;
        Ok(Self {
            config,
            engine,
            client,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline on one document.
    ///
    /// Only a document with no usable content is an error; noise, field gaps,
    /// failed blocks and degraded enrichment are absorbed and counted.
    pub fn run(&self, doc: &dyn RawDocument) -> Result<PipelineOutput, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("extract_document", %run_id);
        let _guard = span.enter();

        tracing::debug!(stage = %PipelineStage::Received, "Document received");
        let result = self.run_stages(doc, run_id);
        match &result {
            Ok(out) => tracing::info!(
                stage = %PipelineStage::Emitted,
                structure = %out.structure,
                records = out.records.len(),
                dropped = out.dropped,
                failed = out.failed,
                degraded = out.enrichment_degraded,
                "Extraction complete"
            ),
            Err(e) => tracing::error!(stage = %PipelineStage::Failed, error = %e, "Extraction failed"),
        }
        result
    }

    fn run_stages(&self, doc: &dyn RawDocument, run_id: Uuid) -> Result<PipelineOutput, PipelineError> {
        let dump = RunDump::open(self.config.debug_dump_dir.as_deref(), &run_id);

        let classified = classify(doc);
        tracing::info!(stage = %PipelineStage::Classified, structure = %classified, "Document classified");

        let (raw_blocks, structure) = self.segment(doc, classified)?;
        let (blocks, dropped) = drop_noise(raw_blocks, self.config.segmentation.min_block_chars);
        tracing::info!(
            stage = %PipelineStage::Segmented,
            structure = %structure,
            blocks = blocks.len(),
            dropped,
            "Document segmented"
        );
        if let Some(dump) = &dump {
            let info = StructureDump {
                run_id: &run_id,
                classified,
                segmented_as: structure,
                blocks: blocks.len(),
                dropped,
            };
            dump.json(Artifact::Structure, &info);
            dump.blocks(&blocks);
        }

        let (blocks, rule_records, failed) = self.extract_all(blocks);
        tracing::info!(
            stage = %PipelineStage::Extracted,
            records = rule_records.len(),
            failed,
            "Rule extraction complete"
        );
        if let Some(dump) = &dump {
            dump.json(Artifact::RuleRecords, &rule_records);
        }

        let (records, enrichment_degraded) = match &self.client {
            Some(client) if self.config.enrichment.mode.is_enabled() => {
                self.enrich_all(client.clone(), &blocks, rule_records)
            }
            _ => (rule_records, 0),
        };

        if let Some(dump) = &dump {
            dump.json(Artifact::FinalRecords, &records);
        }

        Ok(PipelineOutput {
            run_id,
            structure,
            records,
            dropped,
            failed,
            enrichment_degraded,
        })
    }

    /// Segment per the classification, re-validating a tabular verdict.
    fn segment(
        &self,
        doc: &dyn RawDocument,
        classified: StructureKind,
    ) -> Result<(Vec<RecordBlock>, StructureKind), PipelineError> {
        if classified == StructureKind::Tabular {
            match doc.get_tables() {
                Ok(grids) if grids.first().is_some_and(|g| g.len() >= 2) => {
                    let blocks = segment_tables(&grids);
                    if !blocks.is_empty() {
                        return Ok((blocks, StructureKind::Tabular));
                    }
                    tracing::info!("No anchored table rows, falling back to narrative");
                }
                Ok(_) => tracing::info!("First table has no data rows, falling back to narrative"),
                Err(e) => tracing::warn!(error = %e, "Table extraction failed, falling back to narrative"),
            }
        }

        let lines = doc.get_text().map_err(PipelineError::NoReadableText)?;
        if lines.iter().all(|l| l.trim().is_empty()) {
            return Err(PipelineError::NoContent);
        }
        Ok((segment_narrative(&lines), StructureKind::Narrative))
    }

    /// Rule-extract every block on the calling thread. A block whose
    /// extraction panics is dropped and counted.
    fn extract_all(&self, blocks: Vec<RecordBlock>) -> (Vec<RecordBlock>, Vec<ExtractedRecord>, usize) {
        let mut kept = Vec::with_capacity(blocks.len());
        let mut records = Vec::with_capacity(blocks.len());
        let mut failed = 0;

        for block in blocks {
            match panic::catch_unwind(AssertUnwindSafe(|| self.engine.extract_block(&block))) {
                Ok(record) => {
                    tracing::debug!(block = block.index, fields = record.filled_count(), "Block extracted");
                    kept.push(block);
                    records.push(record);
                }
                Err(_) => {
                    tracing::warn!(block = block.index, serial = ?block.serial, "Rule extraction failed, dropping block");
                    failed += 1;
                }
            }
        }
        (kept, records, failed)
    }

    /// Enrich blocks on the worker pool and merge into the rule records.
    /// Returns the merged records and the number of degraded results.
    fn enrich_all(
        &self,
        client: Arc<dyn LlmClient>,
        blocks: &[RecordBlock],
        rule_records: Vec<ExtractedRecord>,
    ) -> (Vec<ExtractedRecord>, usize) {
        let settings = &self.config.enrichment;
        let enricher = Enricher::new(client, settings);
        let fallback_chars = settings.fallback_summary_chars;

        let results = map_ordered(blocks, settings.worker_count(), |_, block| {
            enricher.enrich(&block.text())
        });

        let mut degraded = 0;
        let records: Vec<ExtractedRecord> = rule_records
            .into_iter()
            .zip(results)
            .zip(blocks)
            .map(|((rule, outcome), block)| {
                let enrichment = outcome.unwrap_or_else(|failure| {
                    let reason = EnrichmentError::TaskFailed(failure.to_string());
                    EnrichmentResult::fallback(block.text().trim(), fallback_chars, &reason)
                });
                if enrichment.is_degraded() {
                    degraded += 1;
                }
                merge(rule, &enrichment, settings.mode, &settings.owned_fields)
            })
            .collect();

        tracing::info!(
            stage = %PipelineStage::Enriched,
            records = records.len(),
            degraded,
            mode = %settings.mode,
            "Enrichment complete"
        );
        (records, degraded)
    }
}
