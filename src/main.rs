use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use sitrep_extract::config::{EnrichmentMode, PipelineConfig};
use sitrep_extract::pipeline::document::MemoryDocument;
use sitrep_extract::{Column, ExtractedRecord, ExtractionPipeline};

/// Extract normalized incident records from a converted report.
#[derive(Parser)]
#[command(name = "sitrep-extract")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Converted document: `.txt`/`.md` text, or `.json` with `text` and `tables`
    input: PathBuf,

    /// Pipeline config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enrichment mode: off, fill or owned
    #[arg(long)]
    enrichment: Option<EnrichmentMode>,

    /// Enrichment worker count
    #[arg(long)]
    workers: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct ColumnInfo {
    key: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct Report<'a> {
    status: &'static str,
    structure: String,
    records: usize,
    dropped: usize,
    failed: usize,
    enrichment_degraded: usize,
    columns: Vec<ColumnInfo>,
    data: &'a [ExtractedRecord],
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    config.apply_env_overrides();

    if let Some(mode) = cli.enrichment {
        config.enrichment.mode = mode;
    }
    if let Some(workers) = cli.workers {
        config.enrichment.workers = workers;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    sitrep_extract::init_tracing();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    tracing::info!(
        version = sitrep_extract::config::APP_VERSION,
        enrichment = %config.enrichment.mode,
        "Starting {}",
        sitrep_extract::config::APP_NAME
    );

    let doc = MemoryDocument::load(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let pipeline = ExtractionPipeline::new(config)?;
    let output = pipeline.run(&doc)?;

    let report = Report {
        status: "success",
        structure: output.structure.to_string(),
        records: output.records.len(),
        dropped: output.dropped,
        failed: output.failed,
        enrichment_degraded: output.enrichment_degraded,
        columns: output
            .columns()
            .iter()
            .map(|c: &Column| ColumnInfo {
                key: c.key(),
                label: c.label(),
            })
            .collect(),
        data: &output.records,
    };

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
