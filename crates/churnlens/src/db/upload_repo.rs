//! Upload history: one row per submitted upload.

use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use super::{Database, DatabaseError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRow {
    pub id: String,
    pub file_name: String,
    pub dataset_name: String,
    pub data_mode: String,
    pub project_name: Option<String>,
    /// Last stage reached (`uploading`, `training`, `complete`, `error`).
    pub stage: String,
    pub total_rows: u64,
    pub auto_fixed: bool,
    pub warnings: Vec<String>,
    pub error: Option<String>,
    pub started_at: String,
    pub finished_at: Option<String>,
}

impl UploadRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let warnings: Option<String> = row.get("warnings")?;
        let warnings = match warnings {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            id: row.get("id")?,
            file_name: row.get("file_name")?,
            dataset_name: row.get("dataset_name")?,
            data_mode: row.get("data_mode")?,
            project_name: row.get("project_name")?,
            stage: row.get("stage")?,
            total_rows: row.get::<_, i64>("total_rows")?.max(0) as u64,
            auto_fixed: row.get("auto_fixed")?,
            warnings,
            error: row.get("error")?,
            started_at: row.get("started_at")?,
            finished_at: row.get("finished_at")?,
        })
    }
}

fn encode_warnings(warnings: &[String]) -> Result<Option<String>, DatabaseError> {
    if warnings.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(warnings)
        .map(Some)
        .map_err(|e| DatabaseError::Json {
            column: "warnings",
            source: e,
        })
}

pub fn insert(db: &Database, upload: &UploadRow) -> Result<(), DatabaseError> {
    let warnings = encode_warnings(&upload.warnings)?;
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO uploads (id, file_name, dataset_name, data_mode, project_name, stage,
             total_rows, auto_fixed, warnings, error, started_at, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                upload.id,
                upload.file_name,
                upload.dataset_name,
                upload.data_mode,
                upload.project_name,
                upload.stage,
                upload.total_rows as i64,
                upload.auto_fixed,
                warnings,
                upload.error,
                upload.started_at,
                upload.finished_at,
            ],
        )?;
        Ok(())
    })
}

/// Records the outcome of an upload. Fields except `id`, names and
/// `started_at` are overwritten.
pub fn update(db: &Database, upload: &UploadRow) -> Result<(), DatabaseError> {
    let warnings = encode_warnings(&upload.warnings)?;
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE uploads SET stage = ?2, total_rows = ?3, auto_fixed = ?4, warnings = ?5,
             error = ?6, finished_at = ?7
             WHERE id = ?1",
            params![
                upload.id,
                upload.stage,
                upload.total_rows as i64,
                upload.auto_fixed,
                warnings,
                upload.error,
                upload.finished_at,
            ],
        )?;
        Ok(())
    })
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<UploadRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM uploads WHERE id = ?1",
                params![id],
                UploadRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Most recent uploads first.
pub fn list_recent(db: &Database, limit: u32) -> Result<Vec<UploadRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM uploads ORDER BY started_at DESC, rowid DESC LIMIT ?1")?;
        let rows = stmt
            .query_map(params![limit], UploadRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
