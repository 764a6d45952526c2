//! Server-side entities mirrored by the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub is_snapshot: bool,
    #[serde(default)]
    pub snapshot_group: Option<String>,
    #[serde(default)]
    pub snapshot_pair_dataset_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub db_path: Option<String>,
    #[serde(default = "default_true")]
    pub exists: bool,
    #[serde(default)]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// External database connection registered for table imports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbConnection {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Lifecycle of the remote model training triggered by an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingState {
    Idle,
    Queued,
    InProgress,
    Complete,
    Error,
}

impl TrainingState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TrainingState::Idle | TrainingState::Complete | TrainingState::Error
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStatus {
    pub status: TrainingState,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TrainingStatus {
    pub fn new(status: TrainingState) -> Self {
        Self {
            status,
            progress: None,
            message: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_deserializes_server_shape() {
        let json = r#"{
            "id": "ds-1",
            "name": "Q1 export",
            "type": "csv",
            "size": 2048,
            "uploadedAt": "2026-01-05T10:00:00Z",
            "rowCount": 120,
            "active": true,
            "isSnapshot": true,
            "snapshotGroup": "2026-Q1",
            "snapshotPairDatasetId": "ds-0"
        }"#;
        let ds: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(ds.kind, "csv");
        assert_eq!(ds.row_count, Some(120));
        assert!(ds.active);
        assert_eq!(ds.snapshot_pair_dataset_id.as_deref(), Some("ds-0"));
    }

    #[test]
    fn test_project_defaults() {
        let p: Project = serde_json::from_str(r#"{"id":"p1","name":"Acme"}"#).unwrap();
        assert!(p.exists);
        assert!(!p.active);
        assert!(p.db_path.is_none());
    }

    #[test]
    fn test_training_state_terminal() {
        let status: TrainingStatus =
            serde_json::from_str(r#"{"status":"in_progress","progress":0.4}"#).unwrap();
        assert_eq!(status.status, TrainingState::InProgress);
        assert!(!status.status.is_terminal());
        assert!(TrainingState::Complete.is_terminal());
    }
}
