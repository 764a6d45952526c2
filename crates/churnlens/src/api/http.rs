use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    ImportDbRequest, ImportDbResponse, NewConnection, NewProject, UploadRequest, UploadResponse,
};
use super::{ChurnApi, ProgressFn};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::model::{Dataset, DbConnection, Project, TrainingStatus};
use crate::sanitize::{redact_url, truncate_body};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Size of the body chunks whose transmission drives upload progress.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// `reqwest` implementation of [`ChurnApi`].
pub struct HttpChurnApi {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl HttpChurnApi {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        token: Option<SecretString>,
    ) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = match Url::parse(trimmed) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => return Err(ApiError::InvalidBaseUrl(redact_url(trimmed))),
        };

        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Builds a client from config, resolving the bearer token.
    pub fn from_config(config: &ApiConfig) -> crate::error::Result<Self> {
        let token = config.token_source().resolve_optional()?;
        let api = Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            token,
        )?;
        log::info!(
            "Churn API client targeting {}",
            redact_url(&config.base_url)
        );
        Ok(api)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends `segments` to the base path, percent-encoding each one so an
    /// id cannot add path components or a query.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| matches!(**s, "" | "." | ".."))
        {
            return Err(ApiError::InvalidPathSegment(bad.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(redact_url(self.base_url.as_str())))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };
        let response = request.send().await?;
        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.client.get(url).query(query)).await?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.client.post(url).json(body)).await?;
        decode(response).await
    }

    async fn post_empty(&self, path: &[&str]) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        self.send(self.client.post(url)).await?;
        Ok(())
    }

    async fn delete(&self, path: &[&str]) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Extracts the `error` or `message` field of a JSON error body, falling
/// back to the (truncated) raw body.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        return "empty response body".to_string();
    }
    truncate_body(body)
}

/// Splits the body into chunks and reports cumulative bytes as each one is
/// pulled by the transport.
fn progress_stream(
    csv: Vec<u8>,
    on_progress: ProgressFn,
) -> impl futures_util::Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Sync + 'static {
    let total = csv.len() as u64;
    let chunks: Vec<Result<Vec<u8>, std::io::Error>> = csv
        .chunks(UPLOAD_CHUNK_SIZE)
        .map(|chunk| Ok(chunk.to_vec()))
        .collect();

    let mut sent = 0u64;
    futures_util::stream::iter(chunks).inspect(move |chunk| {
        if let Ok(chunk) = chunk {
            sent += chunk.len() as u64;
            on_progress(sent, total);
        }
    })
}

#[async_trait]
impl ChurnApi for HttpChurnApi {
    async fn upload_dataset(
        &self,
        request: UploadRequest,
        on_progress: ProgressFn,
    ) -> Result<UploadResponse, ApiError> {
        let UploadRequest {
            csv,
            file_name,
            mappings,
            dataset_name,
            data_mode,
            project_name,
        } = request;
        let total = csv.len() as u64;

        let body = reqwest::Body::wrap_stream(progress_stream(csv, on_progress));
        let file = Part::stream_with_length(body, total)
            .file_name(file_name)
            .mime_str("text/csv")?;
        let mut form = Form::new()
            .part("file", file)
            .text("mappings", mappings.to_string())
            .text("datasetName", dataset_name)
            .text("xDataMode", data_mode.as_str());
        if let Some(project_name) = project_name {
            form = form.text("projectName", project_name);
        }

        let url = self.endpoint(&["data-management", "upload"])?;
        let response = self.send(self.client.post(url).multipart(form)).await?;
        decode(response).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_json(&["data-management", "projects"], &[]).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        self.post_json(&["data-management", "projects"], project)
            .await
    }

    async fn delete_project(&self, project_id: &str) -> Result<(), ApiError> {
        self.delete(&["data-management", "projects", project_id])
            .await
    }

    async fn activate_project(&self, project_id: &str) -> Result<(), ApiError> {
        self.post_empty(&["data-management", "projects", project_id, "activate"])
            .await
    }

    async fn list_datasets(&self, project_id: Option<&str>) -> Result<Vec<Dataset>, ApiError> {
        match project_id {
            Some(id) => {
                self.get_json(&["data-management", "datasets"], &[("projectId", id)])
                    .await
            }
            None => self.get_json(&["data-management", "datasets"], &[]).await,
        }
    }

    async fn activate_dataset(&self, dataset_id: &str) -> Result<(), ApiError> {
        self.post_empty(&["data-management", "datasets", dataset_id, "activate"])
            .await
    }

    async fn delete_dataset(&self, dataset_id: &str) -> Result<(), ApiError> {
        self.delete(&["data-management", "datasets", dataset_id])
            .await
    }

    async fn list_connections(&self) -> Result<Vec<DbConnection>, ApiError> {
        self.get_json(&["data-management", "connections"], &[]).await
    }

    async fn create_connection(
        &self,
        connection: &NewConnection,
    ) -> Result<DbConnection, ApiError> {
        self.post_json(&["data-management", "connections"], connection)
            .await
    }

    async fn delete_connection(&self, connection_id: &str) -> Result<(), ApiError> {
        self.delete(&["data-management", "connections", connection_id])
            .await
    }

    async fn list_tables(&self, connection_id: &str) -> Result<Vec<String>, ApiError> {
        self.get_json(
            &["data-management", "connections", connection_id, "tables"],
            &[],
        )
        .await
    }

    async fn import_from_db(
        &self,
        request: &ImportDbRequest,
    ) -> Result<ImportDbResponse, ApiError> {
        self.post_json(&["data-management", "import", "db"], request)
            .await
    }

    async fn training_status(&self, project_id: Option<&str>) -> Result<TrainingStatus, ApiError> {
        match project_id {
            Some(id) => {
                self.get_json(&["churn", "training", "status"], &[("projectId", id)])
                    .await
            }
            None => self.get_json(&["churn", "training", "status"], &[]).await,
        }
    }
}
