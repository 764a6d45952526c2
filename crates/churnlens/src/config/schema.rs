use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::DataMode;
use crate::secrets::SecretSource;
use crate::validation::ValidationLimits;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    pub api: ApiConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub data_mode: DataMode,
    /// Local SQLite file; `~/.churnlens/data/churnlens.db` when unset.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Config {
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        self.database_path
            .clone()
            .or_else(crate::db::default_database_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    #[serde(default)]
    pub token_env_var: Option<String>,
}

fn default_timeout_secs() -> u64 {
    300
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
            token: None,
            token_file: None,
            token_env_var: None,
        }
    }

    pub fn token_source(&self) -> SecretSource<'_> {
        SecretSource {
            direct: self.token.as_deref(),
            file: self.token_file.as_deref(),
            env_var: self.token_env_var.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default = "default_max_issue_rows")]
    pub max_issue_rows: usize,
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,
    #[serde(default = "default_status_cardinality_limit")]
    pub status_cardinality_limit: usize,
}

fn default_preview_rows() -> usize {
    crate::parser::PREVIEW_ROWS
}

fn default_max_issue_rows() -> usize {
    ValidationLimits::default().max_issue_rows
}

fn default_max_examples() -> usize {
    ValidationLimits::default().max_examples
}

fn default_status_cardinality_limit() -> usize {
    ValidationLimits::default().status_cardinality_limit
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
            max_issue_rows: default_max_issue_rows(),
            max_examples: default_max_examples(),
            status_cardinality_limit: default_status_cardinality_limit(),
        }
    }
}

impl IngestConfig {
    pub fn limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_issue_rows: self.max_issue_rows,
            max_examples: self.max_examples,
            status_cardinality_limit: self.status_cardinality_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}
