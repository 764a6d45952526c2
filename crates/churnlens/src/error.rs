use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Ingest(#[from] IngestError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Preference error: {0}")]
    Preference(#[from] PreferenceError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("{0}")]
    Unknown(String),
}

/// Coarse classification surfaced to callers deciding how to re-prompt the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    MissingWorksheet,
    EmptyDataset,
    MappingIncomplete,
    ValidationFailed,
    NetworkFailure,
    UnknownError,
}

impl ChurnError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChurnError::Ingest(IngestError::UnsupportedFormat(_)) => ErrorKind::UnsupportedFormat,
            ChurnError::Ingest(IngestError::MissingWorksheet) => ErrorKind::MissingWorksheet,
            ChurnError::Ingest(IngestError::EmptyDataset) => ErrorKind::EmptyDataset,
            ChurnError::Ingest(IngestError::MappingIncomplete { .. })
            | ChurnError::Ingest(IngestError::NoFileSelected) => ErrorKind::MappingIncomplete,
            ChurnError::Ingest(IngestError::ValidationFailed { .. }) => {
                ErrorKind::ValidationFailed
            }
            ChurnError::Api(_) => ErrorKind::NetworkFailure,
            _ => ErrorKind::UnknownError,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unsupported file format: '{0}' (expected .csv, .tsv, .txt, .xlsx, .xls or .ods)")]
    UnsupportedFormat(String),

    #[error("The workbook does not contain any worksheet")]
    MissingWorksheet,

    #[error("The file is empty")]
    EmptyDataset,

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Required fields are not mapped: {}", fields.join(", "))]
    MappingIncomplete { fields: Vec<String> },

    #[error("Validation found {issues} issue(s) in the dataset")]
    ValidationFailed { issues: usize },

    #[error("Please select a file first")]
    NoFileSelected,

    #[error("An upload is already in progress")]
    UploadInProgress,

    #[error("No validation result is awaiting a decision")]
    NoPendingDecision,

    #[error("Failed to serialize dataset: {0}")]
    Serialize(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode server response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Invalid identifier '{0}' in request path")]
    InvalidPathSegment(String),
}

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Preference store lock poisoned")]
    LockPoisoned,

    #[error("Invalid value '{value}' for preference '{key}'")]
    InvalidValue { key: String, value: String },

    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),
}

pub type Result<T> = std::result::Result<T, ChurnError>;
