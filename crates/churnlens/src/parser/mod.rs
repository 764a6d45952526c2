pub mod delimited;
pub mod workbook;

use std::path::Path;

use crate::error::IngestError;
use crate::model::TabularPreview;

pub use delimited::{write_csv, DelimitedParser};
pub use workbook::WorkbookParser;

/// Number of data rows kept by the preview variant.
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma/semicolon/pipe separated text, delimiter sniffed from the header line.
    Delimited,
    /// Tab separated text.
    Tsv,
    /// Spreadsheet workbook, first worksheet only.
    Workbook,
}

impl SourceFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" | "txt" => Some(Self::Delimited),
            "tsv" | "tab" => Some(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(extension)
            .ok_or_else(|| IngestError::UnsupportedFormat(extension.to_string()))
    }
}

/// How many data rows a parse keeps in `TabularPreview::rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimit {
    Preview(usize),
    All,
}

impl RowLimit {
    pub fn preview() -> Self {
        RowLimit::Preview(PREVIEW_ROWS)
    }

    pub(crate) fn allows(&self, kept: usize) -> bool {
        match self {
            RowLimit::Preview(max) => kept < *max,
            RowLimit::All => true,
        }
    }
}

pub trait TableParser: Send + Sync {
    fn parse(&self, bytes: &[u8], limit: RowLimit) -> Result<TabularPreview, IngestError>;
    fn supports(&self, format: SourceFormat) -> bool;
}

pub struct ParserRegistry {
    parsers: Vec<Box<dyn TableParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(DelimitedParser::sniffing()),
                Box::new(DelimitedParser::with_delimiter(b'\t')),
                Box::new(WorkbookParser::new()),
            ],
        }
    }

    /// Reads `path` and parses it according to its extension. The file is
    /// only ever opened for reading.
    pub fn parse_path(&self, path: &Path, limit: RowLimit) -> Result<TabularPreview, IngestError> {
        let format = SourceFormat::from_path(path)?;
        let bytes = std::fs::read(path).map_err(|e| IngestError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.parse_bytes(&bytes, format, limit)
    }

    pub fn parse_bytes(
        &self,
        bytes: &[u8],
        format: SourceFormat,
        limit: RowLimit,
    ) -> Result<TabularPreview, IngestError> {
        for parser in &self.parsers {
            if parser.supports(format) {
                return parser.parse(bytes, limit);
            }
        }
        Err(IngestError::UnsupportedFormat(format!("{:?}", format)))
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// True when every cell of the row is blank.
pub(crate) fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_registry_routes_csv() {
        let registry = ParserRegistry::new();

        let mut temp_file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(temp_file, "hr_code,full_name").unwrap();
        writeln!(temp_file, "E1,Ada").unwrap();

        let table = registry.parse_path(temp_file.path(), RowLimit::All).unwrap();
        assert_eq!(table.headers, vec!["hr_code", "full_name"]);
        assert_eq!(table.rows, vec![vec!["E1", "Ada"]]);
    }

    #[test]
    fn test_registry_routes_tsv() {
        let registry = ParserRegistry::new();

        let mut temp_file = NamedTempFile::with_suffix(".tsv").unwrap();
        write!(temp_file, "a\tb\n1,5\t2\n").unwrap();

        let table = registry.parse_path(temp_file.path(), RowLimit::All).unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows[0], vec!["1,5", "2"]);
    }

    #[test]
    fn test_unsupported_format_error() {
        let registry = ParserRegistry::new();

        let temp_file = NamedTempFile::with_suffix(".pdf").unwrap();
        std::fs::write(temp_file.path(), b"%PDF").unwrap();

        match registry.parse_path(temp_file.path(), RowLimit::All) {
            Err(IngestError::UnsupportedFormat(ext)) => assert_eq!(ext, "pdf"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_no_extension_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("export");
        std::fs::write(&file_path, b"a,b\n1,2\n").unwrap();

        let result = ParserRegistry::new().parse_path(&file_path, RowLimit::All);
        assert!(matches!(result, Err(IngestError::UnsupportedFormat(ext)) if ext.is_empty()));
    }

    #[test]
    fn test_file_not_found_error() {
        let result =
            ParserRegistry::new().parse_path(Path::new("/nonexistent/data.csv"), RowLimit::All);
        assert!(matches!(result, Err(IngestError::ReadFile { .. })));
    }

    #[test]
    fn test_parse_does_not_modify_source() {
        let mut temp_file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(temp_file, "a,b\n 1 , 2 \n").unwrap();
        let before = std::fs::read(temp_file.path()).unwrap();

        ParserRegistry::new()
            .parse_path(temp_file.path(), RowLimit::preview())
            .unwrap();

        assert_eq!(std::fs::read(temp_file.path()).unwrap(), before);
    }

    #[test]
    fn test_workbook_extensions() {
        for ext in ["xlsx", "XLSM", "xls", "xlsb", "ods"] {
            assert_eq!(SourceFormat::from_extension(ext), Some(SourceFormat::Workbook));
        }
        assert_eq!(SourceFormat::from_extension("numbers"), None);
    }

    #[test]
    fn test_row_limit_allows() {
        assert!(RowLimit::Preview(2).allows(1));
        assert!(!RowLimit::Preview(2).allows(2));
        assert!(RowLimit::All.allows(usize::MAX - 1));
    }
}
