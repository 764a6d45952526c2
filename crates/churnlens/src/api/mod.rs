//! Client side of the churn analytics HTTP API.

pub mod http;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{Dataset, DbConnection, Project, TrainingStatus};

pub use http::HttpChurnApi;
pub use types::{
    ImportDbRequest, ImportDbResponse, NewConnection, NewProject, UploadRequest, UploadResponse,
};

/// Called with `(bytes_sent, bytes_total)` while a request body streams out.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Remote operations used by the ingestion workflow.
#[async_trait]
pub trait ChurnApi: Send + Sync {
    async fn upload_dataset(
        &self,
        request: UploadRequest,
        on_progress: ProgressFn,
    ) -> Result<UploadResponse, ApiError>;

    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;
    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError>;
    async fn delete_project(&self, project_id: &str) -> Result<(), ApiError>;
    async fn activate_project(&self, project_id: &str) -> Result<(), ApiError>;

    async fn list_datasets(&self, project_id: Option<&str>) -> Result<Vec<Dataset>, ApiError>;
    async fn activate_dataset(&self, dataset_id: &str) -> Result<(), ApiError>;
    async fn delete_dataset(&self, dataset_id: &str) -> Result<(), ApiError>;

    async fn list_connections(&self) -> Result<Vec<DbConnection>, ApiError>;
    async fn create_connection(&self, connection: &NewConnection)
        -> Result<DbConnection, ApiError>;
    async fn delete_connection(&self, connection_id: &str) -> Result<(), ApiError>;
    async fn list_tables(&self, connection_id: &str) -> Result<Vec<String>, ApiError>;
    async fn import_from_db(&self, request: &ImportDbRequest)
        -> Result<ImportDbResponse, ApiError>;

    async fn training_status(&self, project_id: Option<&str>) -> Result<TrainingStatus, ApiError>;
}
