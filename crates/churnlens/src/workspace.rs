//! Current project, its datasets and the refetch cascade around them.

use std::sync::Arc;

use crate::api::{ChurnApi, ImportDbRequest, ImportDbResponse, NewConnection, NewProject};
use crate::config::IngestConfig;
use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::model::{DataMode, Dataset, DbConnection, Project, TrainingStatus};
use crate::prefs::Preferences;
use crate::training::TrainingMonitor;
use crate::upload::{UploadReport, UploadSession};

/// Client-side view of the server workspace.
///
/// Holds no locks; callers that share it wrap it themselves.
pub struct Workspace {
    api: Arc<dyn ChurnApi>,
    prefs: Preferences,
    training: Arc<TrainingMonitor>,
    history: Option<Database>,
    ingest: IngestConfig,

    projects: Vec<Project>,
    current_project: Option<Project>,
    datasets: Vec<Dataset>,
    active_dataset_id: Option<String>,
}

impl Workspace {
    pub fn new(api: Arc<dyn ChurnApi>, prefs: Preferences, training: Arc<TrainingMonitor>) -> Self {
        Self {
            api,
            prefs,
            training,
            history: None,
            ingest: IngestConfig::default(),
            projects: Vec::new(),
            current_project: None,
            datasets: Vec::new(),
            active_dataset_id: None,
        }
    }

    pub fn with_history(mut self, db: Database) -> Self {
        self.history = Some(db);
        self
    }

    pub fn with_ingest(mut self, ingest: IngestConfig) -> Self {
        self.ingest = ingest;
        self
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current_project.as_ref()
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn active_dataset(&self) -> Option<&Dataset> {
        let id = self.active_dataset_id.as_deref()?;
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn data_mode(&self) -> Result<DataMode> {
        Ok(self.prefs.data_mode()?)
    }

    pub fn set_data_mode(&self, mode: DataMode) -> Result<()> {
        self.prefs.set_data_mode(mode)?;
        tracing::info!(mode = %mode, "Data mode changed");
        Ok(())
    }

    /// Last polled training status of the current project.
    pub fn training_status(&self) -> Option<TrainingStatus> {
        let project_id = self.current_project.as_ref().map(|p| p.id.as_str());
        self.training.store().get(project_id)
    }

    /// Refetches the project list; the server's active project becomes current.
    pub async fn refresh_projects(&mut self) -> Result<&[Project]> {
        self.projects = self.api.list_projects().await?;

        let previous = self.current_project.as_ref().map(|p| p.id.clone());
        self.current_project = self
            .projects
            .iter()
            .find(|p| p.active)
            .or_else(|| {
                previous
                    .as_deref()
                    .and_then(|id| self.projects.iter().find(|p| p.id == id))
            })
            .cloned();

        tracing::debug!(
            projects = self.projects.len(),
            current = self.current_project.as_ref().map(|p| p.id.as_str()),
            "Projects refreshed"
        );
        Ok(&self.projects)
    }

    /// Activates `project_id` on the server, then refetches projects and
    /// datasets and restarts training polling for it.
    pub async fn switch_project(&mut self, project_id: &str) -> Result<()> {
        tracing::info!(project_id, "Switching project");
        self.api.activate_project(project_id).await?;
        self.refresh_projects().await?;

        // The server may not flag the new project as active right away.
        if self.current_project.as_ref().map(|p| p.id.as_str()) != Some(project_id) {
            self.current_project = self.projects.iter().find(|p| p.id == project_id).cloned();
        }

        self.load_datasets().await?;
        self.training.start(Some(project_id));
        Ok(())
    }

    /// Refetches datasets of the current project.
    ///
    /// The locally remembered active dataset wins when it still exists,
    /// otherwise the dataset the server flags as active.
    pub async fn load_datasets(&mut self) -> Result<&[Dataset]> {
        let project_id = self.current_project.as_ref().map(|p| p.id.clone());
        self.datasets = self.api.list_datasets(project_id.as_deref()).await?;

        let remembered = self
            .prefs
            .active_dataset_id()?
            .filter(|id| self.datasets.iter().any(|d| &d.id == id));
        self.active_dataset_id =
            remembered.or_else(|| self.datasets.iter().find(|d| d.active).map(|d| d.id.clone()));

        tracing::debug!(
            datasets = self.datasets.len(),
            active = self.active_dataset_id.as_deref(),
            "Datasets loaded"
        );
        Ok(&self.datasets)
    }

    pub async fn activate_dataset(&mut self, dataset_id: &str) -> Result<()> {
        self.api.activate_dataset(dataset_id).await?;
        self.prefs.set_active_dataset_id(Some(dataset_id))?;
        for dataset in &mut self.datasets {
            dataset.active = dataset.id == dataset_id;
        }
        self.active_dataset_id = Some(dataset_id.to_string());
        tracing::info!(dataset_id, "Dataset activated");
        Ok(())
    }

    pub async fn delete_dataset(&mut self, dataset_id: &str) -> Result<()> {
        self.api.delete_dataset(dataset_id).await?;
        self.datasets.retain(|d| d.id != dataset_id);
        if self.active_dataset_id.as_deref() == Some(dataset_id) {
            self.active_dataset_id = None;
            self.prefs.set_active_dataset_id(None)?;
        }
        tracing::info!(dataset_id, "Dataset deleted");
        Ok(())
    }

    /// The snapshot paired with `dataset_id` for delta comparison, if loaded.
    pub fn snapshot_pair(&self, dataset_id: &str) -> Option<&Dataset> {
        let dataset = self.datasets.iter().find(|d| d.id == dataset_id)?;
        if !dataset.is_snapshot {
            return None;
        }
        let pair_id = dataset.snapshot_pair_dataset_id.as_deref()?;
        self.datasets.iter().find(|d| d.id == pair_id)
    }

    pub async fn create_project(&mut self, project: &NewProject) -> Result<Project> {
        let created = self.api.create_project(project).await?;
        tracing::info!(project_id = %created.id, "Project created");
        self.refresh_projects().await?;
        Ok(created)
    }

    pub async fn delete_project(&mut self, project_id: &str) -> Result<()> {
        self.api.delete_project(project_id).await?;
        if self.current_project.as_ref().map(|p| p.id.as_str()) == Some(project_id) {
            self.training.stop();
            self.training.store().clear(Some(project_id));
            self.current_project = None;
            self.datasets.clear();
            self.active_dataset_id = None;
        }
        tracing::info!(project_id, "Project deleted");
        self.refresh_projects().await?;
        Ok(())
    }

    pub async fn connections(&self) -> Result<Vec<DbConnection>> {
        Ok(self.api.list_connections().await?)
    }

    pub async fn create_connection(&self, connection: &NewConnection) -> Result<DbConnection> {
        let created = self.api.create_connection(connection).await?;
        tracing::info!(name = %created.name, kind = %created.kind, "Connection registered");
        Ok(created)
    }

    pub async fn delete_connection(&self, connection_id: &str) -> Result<()> {
        Ok(self.api.delete_connection(connection_id).await?)
    }

    pub async fn tables(&self, connection_id: &str) -> Result<Vec<String>> {
        Ok(self.api.list_tables(connection_id).await?)
    }

    /// Imports a table from a registered connection into the current project.
    pub async fn import_from_database(
        &mut self,
        mut request: ImportDbRequest,
    ) -> Result<ImportDbResponse> {
        if request.project_id.is_none() {
            request.project_id = self.current_project.as_ref().map(|p| p.id.clone());
        }

        let response = self.api.import_from_db(&request).await?;
        if !response.success {
            let message = response
                .error
                .clone()
                .or_else(|| response.message.clone())
                .unwrap_or_else(|| "Import failed".to_string());
            return Err(ApiError::Rejected(message).into());
        }

        tracing::info!(
            table = %request.table_name,
            rows = response.row_count,
            "Database table imported"
        );
        self.after_ingest(response.needs_training).await?;
        Ok(response)
    }

    /// Upload session preconfigured for the current project and data mode.
    pub fn new_upload_session(&self) -> Result<UploadSession> {
        let mut session = UploadSession::new(Arc::clone(&self.api), self.prefs.data_mode()?)
            .with_training(Arc::clone(&self.training))
            .with_limits(self.ingest.limits())
            .with_preview_rows(self.ingest.preview_rows);
        if let Some(project) = &self.current_project {
            session = session.with_project(project);
        }
        if let Some(db) = &self.history {
            session = session.with_history(db.clone());
        }
        Ok(session)
    }

    /// Refreshes datasets once an upload has been accepted. Training polling
    /// was already started by the session when the server asked for it.
    pub async fn upload_finished(&mut self, report: &UploadReport) -> Result<()> {
        tracing::debug!(
            dataset = %report.dataset_name,
            needs_training = report.needs_training,
            "Upload finished"
        );
        self.load_datasets().await?;
        Ok(())
    }

    async fn after_ingest(&mut self, needs_training: bool) -> Result<()> {
        self.load_datasets().await?;
        if needs_training {
            let project_id = self.current_project.as_ref().map(|p| p.id.clone());
            self.training.start(project_id.as_deref());
        }
        Ok(())
    }
}
