use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::{NaiveDateTime, Timelike};

use super::{is_blank_row, RowLimit, SourceFormat, TableParser};
use crate::error::IngestError;
use crate::model::TabularPreview;

/// Reads the first worksheet of a spreadsheet workbook (xlsx, xlsm, xls,
/// xlsb or ods).
///
/// Cells come through as their displayed text: date-formatted cells become
/// `YYYY-MM-DD` (with a time when one is set), booleans `TRUE`/`FALSE`, and
/// numbers their shortest decimal form.
pub struct WorkbookParser;

impl WorkbookParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WorkbookParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TableParser for WorkbookParser {
    fn parse(&self, bytes: &[u8], limit: RowLimit) -> Result<TabularPreview, IngestError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| IngestError::Workbook(format!("Failed to open workbook: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(IngestError::MissingWorksheet)?
            .map_err(|e| IngestError::Workbook(format!("Failed to read first worksheet: {}", e)))?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(display_text).collect::<Vec<String>>());

        let headers: Vec<String> = match rows.next() {
            Some(row) => row.into_iter().map(|h| h.trim().to_string()).collect(),
            None => return Err(IngestError::EmptyDataset),
        };
        if is_blank_row(&headers) {
            return Err(IngestError::EmptyDataset);
        }

        let mut kept = Vec::new();
        let mut total_rows = 0;
        for row in rows {
            if is_blank_row(&row) {
                continue;
            }
            total_rows += 1;
            if limit.allows(kept.len()) {
                kept.push(row);
            }
        }

        Ok(TabularPreview {
            headers,
            rows: kept,
            total_rows,
        })
    }

    fn supports(&self, format: SourceFormat) -> bool {
        matches!(format, SourceFormat::Workbook)
    }
}

fn display_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => excel_date_text(dt),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(|dt| date_text(&dt))
            .unwrap_or_else(|_| s.clone()),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn excel_date_text(value: &ExcelDateTime) -> String {
    if value.is_datetime() {
        if let Some(dt) = value.as_datetime() {
            return date_text(&dt);
        }
    }
    value.as_f64().to_string()
}

/// Date only at midnight, date and time otherwise.
fn date_text(dt: &NaiveDateTime) -> String {
    if dt.num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
