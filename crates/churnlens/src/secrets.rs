//! Resolution of the API bearer token.
//!
//! A token can be given inline, read from a file (mounted secrets) or taken
//! from an environment variable. The first configured source wins.

use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Secret file '{path}' is empty")]
    EmptyFile { path: PathBuf },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

/// Where a secret may come from, in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSource<'a> {
    pub direct: Option<&'a str>,
    pub file: Option<&'a Path>,
    pub env_var: Option<&'a str>,
}

impl SecretSource<'_> {
    pub fn is_configured(&self) -> bool {
        self.direct.is_some_and(|s| !s.is_empty())
            || self.file.is_some_and(|p| !p.as_os_str().is_empty())
            || self.env_var.is_some_and(|s| !s.is_empty())
    }

    pub fn resolve(&self) -> Result<SecretString, SecretError> {
        if let Some(value) = self.direct.filter(|v| !v.is_empty()) {
            return Ok(SecretString::from(value.to_string()));
        }

        if let Some(path) = self.file.filter(|p| !p.as_os_str().is_empty()) {
            let expanded = expand_home(path);
            let content = fs::read_to_string(&expanded).map_err(|e| SecretError::FileRead {
                path: expanded.clone(),
                source: e,
            })?;
            let trimmed = content.trim();
            if trimmed.is_empty() {
                return Err(SecretError::EmptyFile { path: expanded });
            }
            return Ok(SecretString::from(trimmed.to_string()));
        }

        if let Some(name) = self.env_var.filter(|n| !n.is_empty()) {
            return match std::env::var(name) {
                Ok(value) => Ok(SecretString::from(value.trim().to_string())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: name.to_string(),
                }),
            };
        }

        Err(SecretError::NoSourceProvided)
    }

    /// Like [`resolve`](Self::resolve), but an unconfigured source is `None`.
    pub fn resolve_optional(&self) -> Result<Option<SecretString>, SecretError> {
        match self.resolve() {
            Ok(secret) => Ok(Some(secret)),
            Err(SecretError::NoSourceProvided) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

pub fn resolve_secret(
    direct: Option<&str>,
    file: Option<&Path>,
    env_var: Option<&str>,
) -> Result<SecretString, SecretError> {
    SecretSource {
        direct,
        file,
        env_var,
    }
    .resolve()
}

pub fn resolve_secret_optional(
    direct: Option<&str>,
    file: Option<&Path>,
    env_var: Option<&str>,
) -> Result<Option<SecretString>, SecretError> {
    SecretSource {
        direct,
        file,
        env_var,
    }
    .resolve_optional()
}

/// Expands a leading `~` to the home directory. `~user` is not supported.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
