//! Request and response bodies exchanged with the churn API.

use serde::{Deserialize, Serialize};

use crate::model::DataMode;

/// Multipart payload of `POST /data-management/upload`.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    /// Canonical CSV, regardless of the source format.
    pub csv: Vec<u8>,
    pub file_name: String,
    /// `{field_key: header}` object, sent as a JSON string part.
    pub mappings: serde_json::Value,
    pub dataset_name: String,
    pub data_mode: DataMode,
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub needs_training: bool,
}

fn default_success() -> bool {
    true
}

impl Default for UploadResponse {
    fn default() -> Self {
        Self {
            success: default_success(),
            message: None,
            error: None,
            dataset_id: None,
            needs_training: false,
        }
    }
}

impl UploadResponse {
    /// Message to surface when the server refused the dataset.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Upload failed".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Connection registration; the password only ever travels to the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConnection {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Body of `POST /data-management/import/db`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDbRequest {
    pub connection_id: String,
    pub table_name: String,
    pub dataset_name: String,
    pub data_mode: DataMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mappings: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDbResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub needs_training: bool,
}
