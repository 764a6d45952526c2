use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Source syntax of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// `.yaml`/`.yml` are YAML; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content, ConfigFormat::from_path(path))
}

pub fn load_config_from_str(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let value: serde_json::Value = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };

    validate_schema(&value)?;

    let config: Config = serde_json::from_value(value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let errors: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
    if !errors.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: errors.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let base_url = config.api.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::Validation {
            message: format!(
                "api.base_url must start with http:// or https://, got '{}'",
                crate::sanitize::redact_url(base_url)
            ),
        });
    }

    let limits = [
        ("api.timeout_secs", config.api.timeout_secs as usize),
        ("ingest.preview_rows", config.ingest.preview_rows),
        ("ingest.max_issue_rows", config.ingest.max_issue_rows),
        ("ingest.max_examples", config.ingest.max_examples),
        (
            "ingest.status_cardinality_limit",
            config.ingest.status_cardinality_limit,
        ),
        (
            "training.poll_interval_secs",
            config.training.poll_interval_secs as usize,
        ),
    ];
    for (name, value) in limits {
        if value == 0 {
            return Err(ConfigError::Validation {
                message: format!("{} must be greater than zero", name),
            });
        }
    }

    Ok(())
}
