//! Pipeline configuration: defaults, JSON file loading, environment overrides.
//!
//! Every tunable the pipeline consumes lives here, including the rule tables,
//! so extraction behaviour can change without touching extraction code.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Column;
use crate::pipeline::rules::{RuleError, RuleTables};
use crate::pipeline::segment::DEFAULT_MIN_BLOCK_CHARS;

/// Application-level constants
pub const APP_NAME: &str = "sitrep-extract";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_OLLAMA_URL: &str = "SITREP_OLLAMA_URL";
pub const ENV_LLM_MODEL: &str = "SITREP_LLM_MODEL";
pub const ENV_ENRICHMENT: &str = "SITREP_ENRICHMENT";
pub const ENV_WORKERS: &str = "SITREP_WORKERS";
pub const ENV_DUMP_DIR: &str = "SITREP_DUMP_DIR";

/// Bounds for the per-call enrichment timeout.
pub const MIN_TIMEOUT_SECS: u64 = 15;
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "warn,sitrep_extract=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("Invalid rule table: {0}")]
    Rules(#[from] RuleError),
}

// ═══════════════════════════════════════════════════════════
// Enrichment mode
// ═══════════════════════════════════════════════════════════

/// How enrichment output is combined with rule output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentMode {
    /// Rules only; the service is never called.
    #[default]
    Off,
    /// Enrichment fills fields the rules left empty.
    Fill,
    /// As `Fill`, and enrichment also overrides its owned fields.
    Owned,
}

impl EnrichmentMode {
    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }
}

impl FromStr for EnrichmentMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "false" | "0" => Ok(Self::Off),
            "fill" | "on" | "true" | "1" => Ok(Self::Fill),
            "owned" => Ok(Self::Owned),
            _ => Err(ConfigError::InvalidValue {
                field: "enrichment.mode",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for EnrichmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Fill => write!(f, "fill"),
            Self::Owned => write!(f, "owned"),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Sections
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Blocks with fewer significant characters are dropped as noise.
    pub min_block_chars: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_block_chars: DEFAULT_MIN_BLOCK_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub mode: EnrichmentMode,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Block text is cut to this many characters before the call.
    pub max_input_chars: usize,
    /// Length of the summary carried by a fallback result.
    pub fallback_summary_chars: usize,
    pub workers: usize,
    /// Fields enrichment may override in `owned` mode.
    pub owned_fields: Vec<Column>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            mode: EnrichmentMode::Off,
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            timeout_secs: 180,
            max_input_chars: 4000,
            fallback_summary_chars: 300,
            workers: 4,
            owned_fields: vec![Column::Heading, Column::InputSummary],
        }
    }
}

impl EnrichmentConfig {
    /// Per-call timeout, clamped to a sane range.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
    }

    /// Worker pool size, at least one.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

// ═══════════════════════════════════════════════════════════
// PipelineConfig
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub segmentation: SegmentationConfig,
    pub enrichment: EnrichmentConfig,
    pub rules: RuleTables,
    /// When set, intermediate artifacts are written under this directory.
    pub debug_dump_dir: Option<PathBuf>,
}

impl PipelineConfig {
    /// Load from a JSON file. Missing sections and fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded pipeline config");
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Invalid values are ignored with
    /// a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_OLLAMA_URL) {
            self.enrichment.base_url = url.trim().to_string();
        }
        if let Some(model) = lookup(ENV_LLM_MODEL) {
            self.enrichment.model = model.trim().to_string();
        }
        if let Some(mode) = lookup(ENV_ENRICHMENT) {
            match mode.parse() {
                Ok(mode) => self.enrichment.mode = mode,
                Err(e) => tracing::warn!(key = ENV_ENRICHMENT, error = %e, "Ignoring override"),
            }
        }
        if let Some(workers) = lookup(ENV_WORKERS) {
            match workers.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.enrichment.workers = n,
                _ => tracing::warn!(key = ENV_WORKERS, value = %workers, "Ignoring override"),
            }
        }
        if let Some(dir) = lookup(ENV_DUMP_DIR) {
            self.debug_dump_dir = Some(PathBuf::from(dir.trim()));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segmentation.min_block_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "segmentation.min_block_chars",
                value: "0".into(),
            });
        }
        if self.enrichment.max_input_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "enrichment.max_input_chars",
                value: "0".into(),
            });
        }
        if self.enrichment.mode.is_enabled() {
            if self.enrichment.base_url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "enrichment.base_url",
                    value: self.enrichment.base_url.clone(),
                });
            }
            if self.enrichment.model.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "enrichment.model",
                    value: self.enrichment.model.clone(),
                });
            }
        }
        Ok(())
    }
}
