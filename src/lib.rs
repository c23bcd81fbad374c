pub mod config;
pub mod models;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

pub use config::PipelineConfig;
pub use models::{Column, ExtractedRecord, COLUMNS};
pub use pipeline::{ExtractionPipeline, PipelineError, PipelineOutput};

/// Install the global `tracing` subscriber. `RUST_LOG` wins over the default
/// filter. Logs go to stderr so stdout stays clean for JSON output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
