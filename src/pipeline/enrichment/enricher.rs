use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::client::LlmClient;
use super::{parser, prompt, EnrichmentError};
use crate::config::EnrichmentConfig;
use crate::models::ExtractedRecord;
use crate::pipeline::rules::patterns::truncate_chars;

/// Below this many characters a block is not worth a service call.
const MIN_ENRICH_CHARS: usize = 10;

/// Output of one enrichment call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentResult {
    pub record: ExtractedRecord,
    /// Why the service result could not be used. `Some` marks a fallback.
    pub degraded: Option<String>,
}

impl EnrichmentResult {
    /// Minimal result: only the truncated input as summary.
    pub fn fallback(text: &str, summary_chars: usize, reason: &EnrichmentError) -> Self {
        let mut record = ExtractedRecord::new();
        record.input_summary = Some(truncate_chars(text, summary_chars));
        Self {
            record,
            degraded: Some(reason.to_string()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Calls the enrichment service for one block at a time.
///
/// Shared by reference across worker threads. The "service unreachable"
/// warning is logged once per instance; repeats go to debug.
pub struct Enricher {
    client: Arc<dyn LlmClient>,
    model: String,
    max_input_chars: usize,
    fallback_summary_chars: usize,
    unreachable_logged: AtomicBool,
}

impl Enricher {
    pub fn new(client: Arc<dyn LlmClient>, config: &EnrichmentConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            max_input_chars: config.max_input_chars,
            fallback_summary_chars: config.fallback_summary_chars,
            unreachable_logged: AtomicBool::new(false),
        }
    }

    /// Enrich one block. Never fails: any service or payload problem yields
    /// a fallback result.
    pub fn enrich(&self, text: &str) -> EnrichmentResult {
        let text = text.trim();
        if text.chars().count() < MIN_ENRICH_CHARS {
            return EnrichmentResult::default();
        }

        let input = truncate_chars(text, self.max_input_chars);
        let user = prompt::build_user_prompt(&input);

        let outcome = self
            .client
            .chat(&self.model, prompt::SYSTEM_PROMPT, &user)
            .and_then(|raw| parser::parse_payload(&raw));

        match outcome {
            Ok(mut record) => {
                if record.input_summary.is_none() {
                    record.input_summary = Some(truncate_chars(text, self.fallback_summary_chars));
                }
                tracing::debug!(fields = record.filled_count(), "Enrichment completed");
                EnrichmentResult {
                    record,
                    degraded: None,
                }
            }
            Err(e) => {
                self.log_failure(&e);
                EnrichmentResult::fallback(text, self.fallback_summary_chars, &e)
            }
        }
    }

    fn log_failure(&self, e: &EnrichmentError) {
        if e.is_unreachable() {
            if !self.unreachable_logged.swap(true, Ordering::Relaxed) {
                tracing::warn!(
                    error = %e,
                    "Enrichment service unreachable, using fallback results"
                );
            } else {
                tracing::debug!(error = %e, "Enrichment service still unreachable");
            }
        } else {
            tracing::warn!(error = %e, "Enrichment failed, using fallback result");
        }
    }

    /// Whether this instance has already reported the service as unreachable.
    pub fn reported_unreachable(&self) -> bool {
        self.unreachable_logged.load(Ordering::Relaxed)
    }
}
