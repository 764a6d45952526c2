//! Fixture files in an isolated temp directory.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use churnlens::parser::{DelimitedParser, RowLimit, TableParser};
use churnlens::TabularPreview;

/// Header row matching the wage-mode template.
pub const EMPLOYEE_HEADERS: &str =
    "hr_code,full_name,structure_name,position,employee_cost,status,manager_id,tenure";

pub struct TestHarness {
    temp_dir: TempDir,
    /// Directory holding the written fixtures.
    pub input_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input_dir = temp_dir.path().join("input");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input dir");
        Self {
            temp_dir,
            input_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_input(&self, filename: &str, content: &[u8]) -> PathBuf {
        let path = self.input_dir.join(filename);
        std::fs::write(&path, content).expect("Failed to write input file");
        path
    }

    pub fn write_text_input(&self, filename: &str, content: &str) -> PathBuf {
        self.write_input(filename, content.as_bytes())
    }

    /// Writes `EMPLOYEE_HEADERS` followed by `rows` as a CSV file.
    pub fn write_employees(&self, filename: &str, rows: &[&str]) -> PathBuf {
        let mut content = String::from(EMPLOYEE_HEADERS);
        content.push('\n');
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        self.write_text_input(filename, &content)
    }

    /// Writes a single-sheet workbook with inline string cells.
    pub fn write_workbook(&self, filename: &str, rows: &[Vec<&str>]) -> PathBuf {
        let mut sheet = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (r, row) in rows.iter().enumerate() {
            sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, value) in row.iter().enumerate() {
                let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
                sheet.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference, value
                ));
            }
            sheet.push_str("</row>");
        }
        sheet.push_str("</sheetData></worksheet>");

        let parts = [
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Employees" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
            ),
            ("xl/worksheets/sheet1.xml", sheet),
        ];

        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer
                .start_file(name, SimpleFileOptions::default())
                .expect("Failed to start zip entry");
            writer
                .write_all(content.as_bytes())
                .expect("Failed to write zip entry");
        }
        let bytes = writer.finish().expect("Failed to finish workbook").into_inner();
        self.write_input(filename, &bytes)
    }
}

/// Parses the CSV body of a recorded upload.
pub fn parse_uploaded_csv(csv: &[u8]) -> TabularPreview {
    DelimitedParser::with_delimiter(b',')
        .parse(csv, RowLimit::All)
        .expect("Uploaded body should be valid CSV")
}
