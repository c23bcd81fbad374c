//! Optional semantic enrichment through an external text-generation service.
//!
//! Each block is sent to the service on its own; the reply is parsed into an
//! [`ExtractedRecord`](crate::models::ExtractedRecord) and merged with the
//! rule-engine result. Every failure degrades to a fallback result, so
//! [`EnrichmentError`] never reaches the pipeline caller.

pub mod client;
pub mod enricher;
pub mod merge;
pub mod parser;
pub mod prompt;

pub use client::{LlmClient, MockLlmClient, OllamaClient};
pub use enricher::{Enricher, EnrichmentResult};
pub use merge::merge;

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Enrichment service is not reachable at {0}")]
    Connection(String),

    #[error("Enrichment request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Enrichment service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Empty response from enrichment service")]
    EmptyResponse,

    #[error("No JSON payload found in response")]
    NoPayload,

    #[error("Malformed JSON payload: {0}")]
    MalformedPayload(String),

    #[error("Enrichment task failed: {0}")]
    TaskFailed(String),
}

impl EnrichmentError {
    /// The service could not be reached at all. This usually persists for
    /// the rest of a run.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
