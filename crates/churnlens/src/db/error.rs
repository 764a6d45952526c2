use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Local store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cannot create store directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema upgrade to v{version} failed: {reason}")]
    Migration { version: u32, reason: String },

    /// Upload warnings are kept as a JSON array.
    #[error("Stored warnings in '{column}' are not valid JSON: {source}")]
    Json {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Local store lock poisoned")]
    LockPoisoned,
}
