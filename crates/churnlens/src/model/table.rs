use serde::{Deserialize, Serialize};

/// Uniform tabular view of an uploaded spreadsheet.
///
/// `rows` may be truncated (preview variant) while `total_rows` always
/// counts every data row of the source, header excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabularPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

impl TabularPreview {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let total_rows = rows.len();
        Self {
            headers,
            rows,
            total_rows,
        }
    }

    /// Position of the first header equal to `header`.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn has_column(&self, header: &str) -> bool {
        self.column_index(header).is_some()
    }

    /// Cell text, with cells beyond the end of a short row read as `""`.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows == 0
    }
}
