//! Recording in-memory implementation of `ChurnApi`.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use churnlens::api::{
    ImportDbRequest, ImportDbResponse, NewConnection, NewProject, ProgressFn, UploadRequest,
    UploadResponse,
};
use churnlens::model::{Dataset, DbConnection, Project, TrainingState, TrainingStatus};
use churnlens::{ApiError, ChurnApi};

pub struct MockApi {
    calls: Mutex<Vec<String>>,
    uploads: Mutex<Vec<UploadRequest>>,
    upload_result: Mutex<Result<UploadResponse, (u16, String)>>,
    projects: Mutex<Vec<Project>>,
    /// `(project_id, dataset)` pairs.
    datasets: Mutex<Vec<(String, Dataset)>>,
    connections: Mutex<Vec<DbConnection>>,
    import_response: Mutex<ImportDbResponse>,
    /// Statuses handed out in order; the last one repeats.
    training: Mutex<VecDeque<TrainingStatus>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            upload_result: Mutex::new(Ok(UploadResponse {
                success: true,
                message: Some("Dataset uploaded".to_string()),
                dataset_id: Some("ds-new".to_string()),
                ..Default::default()
            })),
            projects: Mutex::new(Vec::new()),
            datasets: Mutex::new(Vec::new()),
            connections: Mutex::new(Vec::new()),
            import_response: Mutex::new(ImportDbResponse {
                success: true,
                message: None,
                error: None,
                dataset_id: Some("ds-import".to_string()),
                row_count: Some(42),
                needs_training: false,
            }),
            training: Mutex::new(VecDeque::from([TrainingStatus::new(TrainingState::Idle)])),
        }
    }

    pub fn with_upload_response(self, response: UploadResponse) -> Self {
        *self.upload_result.lock().unwrap() = Ok(response);
        self
    }

    pub fn set_upload_response(&self, response: UploadResponse) {
        *self.upload_result.lock().unwrap() = Ok(response);
    }

    pub fn set_upload_status_error(&self, status: u16, message: &str) {
        *self.upload_result.lock().unwrap() = Err((status, message.to_string()));
    }

    pub fn with_project(self, id: &str, name: &str, active: bool) -> Self {
        self.projects.lock().unwrap().push(project(id, name, active));
        self
    }

    pub fn with_dataset(self, project_id: &str, dataset: Dataset) -> Self {
        self.datasets
            .lock()
            .unwrap()
            .push((project_id.to_string(), dataset));
        self
    }

    pub fn with_import_response(self, response: ImportDbResponse) -> Self {
        *self.import_response.lock().unwrap() = response;
        self
    }

    pub fn with_training_sequence(self, states: &[TrainingState]) -> Self {
        *self.training.lock().unwrap() = states.iter().map(|s| TrainingStatus::new(*s)).collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn last_upload(&self) -> UploadRequest {
        self.uploads()
            .pop()
            .expect("Expected at least one recorded upload")
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn project(id: &str, name: &str, active: bool) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        path: None,
        db_path: None,
        exists: true,
        active,
    }
}

pub fn dataset(id: &str, active: bool) -> Dataset {
    Dataset {
        id: id.to_string(),
        name: format!("Dataset {}", id),
        kind: "csv".to_string(),
        size: 1024,
        uploaded_at: None,
        row_count: Some(10),
        active,
        is_snapshot: false,
        snapshot_group: None,
        snapshot_pair_dataset_id: None,
    }
}

#[async_trait]
impl ChurnApi for MockApi {
    async fn upload_dataset(
        &self,
        request: UploadRequest,
        on_progress: ProgressFn,
    ) -> Result<UploadResponse, ApiError> {
        self.record(format!("upload_dataset:{}", request.dataset_name));
        let total = request.csv.len() as u64;
        on_progress(total / 2, total);
        on_progress(total, total);
        self.uploads.lock().unwrap().push(request);

        match self.upload_result.lock().unwrap().clone() {
            Ok(response) => Ok(response),
            Err((status, message)) => Err(ApiError::Status { status, message }),
        }
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.record("list_projects".to_string());
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn create_project(&self, new_project: &NewProject) -> Result<Project, ApiError> {
        self.record(format!("create_project:{}", new_project.name));
        let mut projects = self.projects.lock().unwrap();
        let created = project(
            &format!("p{}", projects.len() + 1),
            &new_project.name,
            false,
        );
        projects.push(created.clone());
        Ok(created)
    }

    async fn delete_project(&self, project_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_project:{}", project_id));
        self.projects.lock().unwrap().retain(|p| p.id != project_id);
        Ok(())
    }

    async fn activate_project(&self, project_id: &str) -> Result<(), ApiError> {
        self.record(format!("activate_project:{}", project_id));
        let mut projects = self.projects.lock().unwrap();
        if !projects.iter().any(|p| p.id == project_id) {
            return Err(ApiError::Status {
                status: 404,
                message: "Project not found".to_string(),
            });
        }
        for project in projects.iter_mut() {
            project.active = project.id == project_id;
        }
        Ok(())
    }

    async fn list_datasets(&self, project_id: Option<&str>) -> Result<Vec<Dataset>, ApiError> {
        self.record(format!("list_datasets:{}", project_id.unwrap_or("-")));
        Ok(self
            .datasets
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| project_id.map_or(true, |id| p == id))
            .map(|(_, d)| d.clone())
            .collect())
    }

    async fn activate_dataset(&self, dataset_id: &str) -> Result<(), ApiError> {
        self.record(format!("activate_dataset:{}", dataset_id));
        for (_, dataset) in self.datasets.lock().unwrap().iter_mut() {
            dataset.active = dataset.id == dataset_id;
        }
        Ok(())
    }

    async fn delete_dataset(&self, dataset_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_dataset:{}", dataset_id));
        self.datasets
            .lock()
            .unwrap()
            .retain(|(_, d)| d.id != dataset_id);
        Ok(())
    }

    async fn list_connections(&self) -> Result<Vec<DbConnection>, ApiError> {
        self.record("list_connections".to_string());
        Ok(self.connections.lock().unwrap().clone())
    }

    async fn create_connection(
        &self,
        connection: &NewConnection,
    ) -> Result<DbConnection, ApiError> {
        self.record(format!("create_connection:{}", connection.name));
        let mut connections = self.connections.lock().unwrap();
        let created = DbConnection {
            id: Some(format!("c{}", connections.len() + 1)),
            name: connection.name.clone(),
            kind: connection.kind.clone(),
            host: connection.host.clone(),
            port: connection.port,
            database: connection.database.clone(),
            username: connection.username.clone(),
        };
        connections.push(created.clone());
        Ok(created)
    }

    async fn delete_connection(&self, connection_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_connection:{}", connection_id));
        self.connections
            .lock()
            .unwrap()
            .retain(|c| c.id.as_deref() != Some(connection_id));
        Ok(())
    }

    async fn list_tables(&self, connection_id: &str) -> Result<Vec<String>, ApiError> {
        self.record(format!("list_tables:{}", connection_id));
        Ok(vec!["employees".to_string(), "departments".to_string()])
    }

    async fn import_from_db(
        &self,
        request: &ImportDbRequest,
    ) -> Result<ImportDbResponse, ApiError> {
        self.record(format!(
            "import_from_db:{}:{}",
            request.table_name,
            request.project_id.as_deref().unwrap_or("-")
        ));
        Ok(self.import_response.lock().unwrap().clone())
    }

    async fn training_status(&self, project_id: Option<&str>) -> Result<TrainingStatus, ApiError> {
        self.record(format!("training_status:{}", project_id.unwrap_or("-")));
        let mut queue = self.training.lock().unwrap();
        let status = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(status.unwrap_or_else(|| TrainingStatus::new(TrainingState::Idle)))
    }
}
