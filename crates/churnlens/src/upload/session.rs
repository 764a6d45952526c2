//! One upload dialog: file selection, mapping, validation and transmission.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::Instrument;

use super::progress::{NoopProgress, UploadProgress};
use super::state::{Decision, UploadStage};
use crate::api::{ChurnApi, ProgressFn, UploadRequest};
use crate::db::upload_repo::{self, UploadRow};
use crate::db::Database;
use crate::error::{ApiError, ChurnError, IngestError, Result};
use crate::fix::auto_fix;
use crate::mapping::auto_map;
use crate::model::{
    CanonicalField, ColumnMapping, DataMode, Project, TabularPreview, ValidationResult,
};
use crate::parser::{write_csv, ParserRegistry, RowLimit, SourceFormat, PREVIEW_ROWS};
use crate::sanitize::{dataset_name_from_path, redact_path};
use crate::training::TrainingMonitor;
use crate::validation::{validate, ValidationLimits};

/// Share of the progress bar reserved for reading and serializing the file.
const LOCAL_PROGRESS: u8 = 10;

struct SelectedFile {
    path: PathBuf,
    format: SourceFormat,
    preview: TabularPreview,
}

/// Full dataset held between a failed validation and the user's decision.
struct PendingUpload {
    bytes: Arc<Vec<u8>>,
    table: TabularPreview,
}

/// Serialized body ready for transmission.
struct Payload {
    csv: Vec<u8>,
    total_rows: usize,
    auto_fixed: bool,
    warnings: Vec<String>,
}

/// History row of the current submit attempt.
struct Attempt {
    row: UploadRow,
    stored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub session_id: String,
    pub dataset_name: String,
    pub dataset_id: Option<String>,
    pub total_rows: usize,
    pub auto_fixed: bool,
    /// Corrections applied by auto-fix, or the reason it was skipped.
    pub warnings: Vec<String>,
    pub needs_training: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; answer with [`UploadSession::decide`].
    NeedsDecision(ValidationResult),
    Uploaded(UploadReport),
    Cancelled,
}

/// State machine behind a single upload dialog.
///
/// Parsing, validation and auto-fix run on the blocking pool. Every error
/// moves the session to [`UploadStage::Error`] with progress reset to 0 and
/// the message kept verbatim; nothing is retried automatically.
pub struct UploadSession {
    id: String,
    api: Arc<dyn ChurnApi>,
    registry: Arc<ParserRegistry>,
    data_mode: DataMode,
    limits: ValidationLimits,
    preview_rows: usize,
    project_id: Option<String>,
    project_name: Option<String>,
    dataset_name: Option<String>,
    reporter: Arc<dyn UploadProgress>,
    training: Option<Arc<TrainingMonitor>>,
    history: Option<Database>,

    stage: UploadStage,
    progress: Arc<AtomicU8>,
    error: Option<String>,
    selected: Option<SelectedFile>,
    mapping: ColumnMapping,
    diagnosis: Option<ValidationResult>,
    pending: Option<PendingUpload>,
    attempt: Option<Attempt>,
}

impl UploadSession {
    pub fn new(api: Arc<dyn ChurnApi>, data_mode: DataMode) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            api,
            registry: Arc::new(ParserRegistry::new()),
            data_mode,
            limits: ValidationLimits::default(),
            preview_rows: PREVIEW_ROWS,
            project_id: None,
            project_name: None,
            dataset_name: None,
            reporter: Arc::new(NoopProgress),
            training: None,
            history: None,
            stage: UploadStage::Idle,
            progress: Arc::new(AtomicU8::new(0)),
            error: None,
            selected: None,
            mapping: ColumnMapping::new(),
            diagnosis: None,
            pending: None,
            attempt: None,
        }
    }

    /// Uploads into `project` and polls its training status afterwards.
    pub fn with_project(mut self, project: &Project) -> Self {
        self.project_id = Some(project.id.clone());
        self.project_name = Some(project.name.clone());
        self
    }

    pub fn with_progress(mut self, reporter: Arc<dyn UploadProgress>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_training(mut self, monitor: Arc<TrainingMonitor>) -> Self {
        self.training = Some(monitor);
        self
    }

    /// Records every finished attempt in the upload history.
    pub fn with_history(mut self, db: Database) -> Self {
        self.history = Some(db);
        self
    }

    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows.max(1);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stage(&self) -> UploadStage {
        self.stage
    }

    /// 0 to 100.
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Relaxed)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn data_mode(&self) -> DataMode {
        self.data_mode
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn preview(&self) -> Option<&TabularPreview> {
        self.selected.as_ref().map(|s| &s.preview)
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.selected.as_ref().map(|s| s.path.as_path())
    }

    pub fn diagnosis(&self) -> Option<&ValidationResult> {
        self.diagnosis.as_ref()
    }

    /// Overrides the dataset name derived from the file name.
    pub fn set_dataset_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.dataset_name = if name.trim().is_empty() {
            None
        } else {
            Some(name.trim().to_string())
        };
    }

    /// Dataset name that the next upload will use.
    pub fn dataset_name(&self) -> Option<String> {
        self.dataset_name.clone().or_else(|| {
            self.selected
                .as_ref()
                .map(|s| dataset_name_from_path(&s.path))
        })
    }

    /// Reads a preview of `path` and proposes a column mapping for it.
    ///
    /// Any earlier file, mapping and diagnosis are discarded first.
    pub async fn select_file(&mut self, path: impl AsRef<Path>) -> Result<TabularPreview> {
        self.ensure_not_uploading()?;
        self.reset();

        let path = path.as_ref().to_path_buf();
        let span = tracing::info_span!(
            "upload",
            session_id = %self.id,
            file = %redact_path(&path)
        );
        let result = self.load_preview(path).instrument(span).await;
        self.settle(result)
    }

    async fn load_preview(&mut self, path: PathBuf) -> Result<TabularPreview> {
        let format = SourceFormat::from_path(&path)?;
        let bytes = read_source(&path).await?;

        let registry = Arc::clone(&self.registry);
        let limit = RowLimit::Preview(self.preview_rows);
        let preview =
            run_blocking(move || Ok(registry.parse_bytes(&bytes, format, limit)?)).await?;

        self.mapping = auto_map(&preview.headers, self.data_mode);
        tracing::info!(
            columns = preview.headers.len(),
            total_rows = preview.total_rows,
            missing_required = self.mapping.missing_required(self.data_mode).len(),
            "File selected"
        );

        self.selected = Some(SelectedFile {
            path,
            format,
            preview: preview.clone(),
        });
        Ok(preview)
    }

    /// Maps `field` onto `header`, replacing the proposed mapping.
    pub fn set_mapping(&mut self, field: CanonicalField, header: impl Into<String>) -> Result<()> {
        self.ensure_not_uploading()?;
        self.mapping.set(field, header);
        self.discard_diagnosis();
        Ok(())
    }

    pub fn clear_mapping(&mut self, field: CanonicalField) -> Result<()> {
        self.ensure_not_uploading()?;
        self.mapping.clear(field);
        self.discard_diagnosis();
        Ok(())
    }

    /// Validates the whole file and uploads it when it is clean.
    ///
    /// A file with issues stops in [`UploadStage::AwaitingDecision`] and
    /// the diagnosis is returned.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        self.ensure_not_uploading()?;
        let span = self.span();
        let result = self.run_submit().instrument(span).await;
        self.settle(result)
    }

    async fn run_submit(&mut self) -> Result<SubmitOutcome> {
        self.error = None;
        self.pending = None;
        self.diagnosis = None;

        let (path, format) = match &self.selected {
            Some(selected) => (selected.path.clone(), selected.format),
            None => return Err(IngestError::NoFileSelected.into()),
        };
        self.begin_attempt(&path);
        self.mapping.ensure_complete(self.data_mode)?;

        self.set_stage(UploadStage::Validating);
        let bytes = Arc::new(read_source(&path).await?);

        let registry = Arc::clone(&self.registry);
        let source = Arc::clone(&bytes);
        let mapping = self.mapping.clone();
        let (mode, limits) = (self.data_mode, self.limits);
        let (table, result) = run_blocking(move || {
            let table = registry.parse_bytes(&source, format, RowLimit::All)?;
            let result = validate(&table, &mapping, mode, &limits);
            Ok((table, result))
        })
        .await?;

        if !result.valid {
            tracing::info!(
                issues = result.issue_count(),
                total_rows = result.total_rows,
                "Validation found issues"
            );
            self.pending = Some(PendingUpload { bytes, table });
            self.diagnosis = Some(result.clone());
            self.set_stage(UploadStage::AwaitingDecision);
            return Ok(SubmitOutcome::NeedsDecision(result));
        }

        tracing::info!(total_rows = result.total_rows, "Validation passed");
        let payload = serialize_table(table, false, Vec::new()).await?;
        Ok(SubmitOutcome::Uploaded(self.transmit(payload).await?))
    }

    /// Resolves a failed validation.
    pub async fn decide(&mut self, decision: Decision) -> Result<SubmitOutcome> {
        if self.stage != UploadStage::AwaitingDecision || self.pending.is_none() {
            return Err(IngestError::NoPendingDecision.into());
        }
        let span = self.span();
        let result = self.run_decision(decision).instrument(span).await;
        self.settle(result)
    }

    async fn run_decision(&mut self, decision: Decision) -> Result<SubmitOutcome> {
        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => return Err(IngestError::NoPendingDecision.into()),
        };

        match decision {
            Decision::Cancel => {
                tracing::info!("Upload cancelled after validation");
                self.diagnosis = None;
                self.attempt = None;
                self.set_progress(0);
                self.set_stage(UploadStage::Idle);
                Ok(SubmitOutcome::Cancelled)
            }
            Decision::UploadAnyway => {
                tracing::info!("Uploading despite validation issues");
                let payload = serialize_table(pending.table, false, Vec::new()).await?;
                Ok(SubmitOutcome::Uploaded(self.transmit(payload).await?))
            }
            Decision::AutoFix => {
                let payload = self.fixed_payload(pending).await?;
                Ok(SubmitOutcome::Uploaded(self.transmit(payload).await?))
            }
        }
    }

    /// Re-parses the whole file, repairs it and serializes the result.
    ///
    /// When that fails the unmodified data is sent instead: the original
    /// bytes for `.csv`/`.txt` input, otherwise the table as first read.
    async fn fixed_payload(&self, pending: PendingUpload) -> Result<Payload> {
        let format = match &self.selected {
            Some(selected) => selected.format,
            None => return Err(IngestError::NoFileSelected.into()),
        };
        let PendingUpload { bytes, table } = pending;

        let registry = Arc::clone(&self.registry);
        let source = Arc::clone(&bytes);
        let mapping = self.mapping.clone();
        let (mode, limits) = (self.data_mode, self.limits);
        let fixed = run_blocking(move || {
            let reparsed = registry.parse_bytes(&source, format, RowLimit::All)?;
            let outcome = auto_fix(&reparsed, &mapping);
            let remaining = validate(&outcome.table, &mapping, mode, &limits).issue_count();
            let csv = write_csv(&outcome.table)?;
            let payload = Payload {
                csv,
                total_rows: outcome.table.total_rows,
                auto_fixed: true,
                warnings: outcome.warnings,
            };
            Ok((payload, remaining))
        })
        .await;

        match fixed {
            Ok((payload, remaining)) => {
                tracing::info!(
                    corrections = payload.warnings.len(),
                    remaining_issues = remaining,
                    "Auto-fix applied"
                );
                if remaining > 0 {
                    tracing::warn!(remaining, "Issues remain after auto-fix");
                }
                Ok(payload)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Auto-fix failed, uploading the original data");
                let warning = format!(
                    "Automatic fix failed ({}); the original data was uploaded",
                    e
                );
                match format {
                    SourceFormat::Delimited => Ok(Payload {
                        csv: Arc::try_unwrap(bytes).unwrap_or_else(|shared| shared.to_vec()),
                        total_rows: table.total_rows,
                        auto_fixed: false,
                        warnings: vec![warning],
                    }),
                    _ => serialize_table(table, false, vec![warning]).await,
                }
            }
        }
    }

    async fn transmit(&mut self, payload: Payload) -> Result<UploadReport> {
        let Payload {
            csv,
            total_rows,
            auto_fixed,
            warnings,
        } = payload;
        let (file_name, dataset_name) = match &self.selected {
            Some(selected) => (
                upload_file_name(&selected.path),
                self.dataset_name
                    .clone()
                    .unwrap_or_else(|| dataset_name_from_path(&selected.path)),
            ),
            None => return Err(IngestError::NoFileSelected.into()),
        };

        self.set_stage(UploadStage::Uploading);
        self.store_attempt(total_rows, auto_fixed, &warnings);
        self.set_progress(LOCAL_PROGRESS);

        let request = UploadRequest {
            csv,
            file_name,
            mappings: self.mapping.to_payload(),
            dataset_name: dataset_name.clone(),
            data_mode: self.data_mode,
            project_name: self.project_name.clone(),
        };
        let response = self
            .api
            .upload_dataset(request, self.progress_callback())
            .await?;
        if !response.success {
            return Err(ApiError::Rejected(response.failure_message()).into());
        }

        self.set_progress(100);
        let report = UploadReport {
            session_id: self.id.clone(),
            dataset_name,
            dataset_id: response.dataset_id.clone(),
            total_rows,
            auto_fixed,
            warnings,
            needs_training: response.needs_training,
            message: response.message.clone(),
        };

        if response.needs_training {
            self.pending = None;
            self.diagnosis = None;
            self.set_stage(UploadStage::Training);
            if let Some(monitor) = &self.training {
                monitor.start(self.project_id.as_deref());
            }
            self.finish_attempt(UploadStage::Training, None);
        } else {
            self.set_stage(UploadStage::Complete);
            self.clear_transient();
            self.finish_attempt(UploadStage::Complete, None);
        }

        tracing::info!(
            total_rows,
            auto_fixed,
            needs_training = report.needs_training,
            "Upload accepted"
        );
        Ok(report)
    }

    /// Returns to `Idle` and drops the file, mapping and diagnosis.
    pub fn reset(&mut self) {
        self.clear_transient();
        self.attempt = None;
        self.error = None;
        self.stage = UploadStage::Idle;
        self.progress.store(0, Ordering::Relaxed);
    }

    fn clear_transient(&mut self) {
        self.selected = None;
        self.mapping.reset();
        self.diagnosis = None;
        self.pending = None;
    }

    fn discard_diagnosis(&mut self) {
        self.diagnosis = None;
        self.pending = None;
        if self.stage == UploadStage::AwaitingDecision {
            self.attempt = None;
            self.set_stage(UploadStage::Idle);
        }
    }

    fn ensure_not_uploading(&self) -> Result<()> {
        if self.stage == UploadStage::Uploading {
            return Err(IngestError::UploadInProgress.into());
        }
        Ok(())
    }

    fn span(&self) -> tracing::Span {
        let file = self
            .selected
            .as_ref()
            .map(|s| redact_path(&s.path))
            .unwrap_or_default();
        tracing::info_span!("upload", session_id = %self.id, file = %file)
    }

    fn set_stage(&mut self, stage: UploadStage) {
        self.stage = stage;
        tracing::debug!(stage = %stage, "Upload stage changed");
        self.reporter.stage(&self.id, stage, None);
    }

    fn set_progress(&self, percent: u8) {
        self.progress.store(percent, Ordering::Relaxed);
        self.reporter.progress(&self.id, percent);
    }

    fn progress_callback(&self) -> ProgressFn {
        let progress = Arc::clone(&self.progress);
        let reporter = Arc::clone(&self.reporter);
        let session_id = self.id.clone();
        Arc::new(move |sent, total| {
            let percent = upload_percent(sent, total);
            if progress.swap(percent, Ordering::Relaxed) != percent {
                reporter.progress(&session_id, percent);
            }
        })
    }

    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.fail(e);
        }
        result
    }

    fn fail(&mut self, error: &ChurnError) {
        let message = error.to_string();
        tracing::warn!(session_id = %self.id, error = %message, "Upload session failed");
        self.stage = UploadStage::Error;
        self.error = Some(message.clone());
        self.reporter.stage(&self.id, UploadStage::Error, Some(&message));
        self.set_progress(0);
        self.finish_attempt(UploadStage::Error, Some(message));
    }

    fn begin_attempt(&mut self, path: &Path) {
        let dataset_name = self
            .dataset_name
            .clone()
            .unwrap_or_else(|| dataset_name_from_path(path));
        self.attempt = Some(Attempt {
            row: UploadRow {
                id: uuid::Uuid::new_v4().to_string(),
                file_name: redact_path(path),
                dataset_name,
                data_mode: self.data_mode.as_str().to_string(),
                project_name: self.project_name.clone(),
                stage: UploadStage::Validating.as_str().to_string(),
                total_rows: 0,
                auto_fixed: false,
                warnings: Vec::new(),
                error: None,
                started_at: Utc::now().to_rfc3339(),
                finished_at: None,
            },
            stored: false,
        });
    }

    fn store_attempt(&mut self, total_rows: usize, auto_fixed: bool, warnings: &[String]) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        attempt.row.stage = UploadStage::Uploading.as_str().to_string();
        attempt.row.total_rows = total_rows as u64;
        attempt.row.auto_fixed = auto_fixed;
        attempt.row.warnings = warnings.to_vec();

        if let Some(db) = &self.history {
            match upload_repo::insert(db, &attempt.row) {
                Ok(()) => attempt.stored = true,
                Err(e) => tracing::warn!(error = %e, "Failed to record upload start"),
            }
        }
    }

    fn finish_attempt(&mut self, stage: UploadStage, error: Option<String>) {
        let Some(mut attempt) = self.attempt.take() else {
            return;
        };
        let Some(db) = &self.history else {
            return;
        };

        attempt.row.stage = stage.as_str().to_string();
        attempt.row.error = error;
        attempt.row.finished_at = Some(Utc::now().to_rfc3339());

        let result = if attempt.stored {
            upload_repo::update(db, &attempt.row)
        } else {
            upload_repo::insert(db, &attempt.row)
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to record upload outcome");
        }
    }
}

/// Name of the CSV part; workbooks are re-encoded so the extension follows.
fn upload_file_name(path: &Path) -> String {
    format!("{}.csv", dataset_name_from_path(path))
}

fn upload_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let network_share = u64::from(100 - LOCAL_PROGRESS);
    let percent = u64::from(LOCAL_PROGRESS) + sent.min(total) * network_share / total;
    percent as u8
}

async fn read_source(path: &Path) -> std::result::Result<Vec<u8>, IngestError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| IngestError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })
}

async fn serialize_table(
    table: TabularPreview,
    auto_fixed: bool,
    warnings: Vec<String>,
) -> Result<Payload> {
    run_blocking(move || {
        let csv = write_csv(&table)?;
        Ok(Payload {
            csv,
            total_rows: table.total_rows,
            auto_fixed,
            warnings,
        })
    })
    .await
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ChurnError::Unknown(format!("Background task failed: {}", e)))?
}
