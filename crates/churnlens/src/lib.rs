pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod fix;
pub mod mapping;
pub mod model;
pub mod parser;
pub mod prefs;
pub mod route_cache;
pub mod sanitize;
pub mod secrets;
pub mod telemetry;
pub mod template;
pub mod training;
pub mod upload;
pub mod validation;
pub mod workspace;

pub use api::{ChurnApi, HttpChurnApi};
pub use config::{load_config, Config};
pub use error::{ApiError, ChurnError, ConfigError, ErrorKind, IngestError, Result};
pub use fix::{auto_fix, FixOutcome};
pub use mapping::auto_map;
pub use model::{CanonicalField, ColumnMapping, DataMode, TabularPreview, ValidationResult};
pub use parser::{write_csv, ParserRegistry, RowLimit, SourceFormat};
pub use prefs::{PreferenceStore, Preferences};
pub use route_cache::KeepAliveCache;
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use training::{TrainingMonitor, TrainingStore};
pub use upload::{Decision, SubmitOutcome, UploadSession, UploadStage};
pub use validation::{validate, ValidationLimits};
pub use workspace::Workspace;
