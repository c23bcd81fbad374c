pub mod document;
pub mod segment;
pub mod rules;
pub mod enrichment;
pub mod batch; // bounded, order-preserving worker pool for enrichment
pub mod orchestrator;
pub mod diagnostic; // Intermediate artifact dump (debug_dump_dir / SITREP_DUMP_DIR)

pub use orchestrator::{ExtractionPipeline, PipelineError, PipelineOutput, PipelineStage};
