use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};

use super::{is_blank_row, RowLimit, SourceFormat, TableParser};
use crate::error::IngestError;
use crate::model::TabularPreview;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// RFC-4180 style reader for delimited text.
pub struct DelimitedParser {
    /// Fixed delimiter; `None` sniffs it from the header line.
    delimiter: Option<u8>,
}

impl DelimitedParser {
    pub fn sniffing() -> Self {
        Self { delimiter: None }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }
}

impl Default for DelimitedParser {
    fn default() -> Self {
        Self::sniffing()
    }
}

impl TableParser for DelimitedParser {
    fn parse(&self, bytes: &[u8], limit: RowLimit) -> Result<TabularPreview, IngestError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(IngestError::EmptyDataset);
        }

        let delimiter = self
            .delimiter
            .unwrap_or_else(|| sniff_delimiter(header_line(bytes)));

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(bytes);

        let mut records = reader.byte_records();
        let headers: Vec<String> = match records.next() {
            Some(record) => record?
                .iter()
                .map(|h| String::from_utf8_lossy(h).trim().to_string())
                .collect(),
            None => return Err(IngestError::EmptyDataset),
        };
        if is_blank_row(&headers) {
            return Err(IngestError::EmptyDataset);
        }

        let mut rows = Vec::new();
        let mut total_rows = 0;
        for record in records {
            let record = record?;
            let row: Vec<String> = record
                .iter()
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect();
            if is_blank_row(&row) {
                continue;
            }
            total_rows += 1;
            if limit.allows(rows.len()) {
                rows.push(row);
            }
        }

        Ok(TabularPreview {
            headers,
            rows,
            total_rows,
        })
    }

    fn supports(&self, format: SourceFormat) -> bool {
        match self.delimiter {
            Some(b'\t') => format == SourceFormat::Tsv,
            _ => format == SourceFormat::Delimited,
        }
    }
}

fn header_line(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == b'\n').unwrap_or(bytes.len());
    &bytes[..end]
}

/// Picks the candidate occurring most often outside quotes; comma wins ties.
fn sniff_delimiter(line: &[u8]) -> u8 {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for &b in line {
        if b == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(i) = CANDIDATE_DELIMITERS.iter().position(|&d| d == b) {
            counts[i] += 1;
        }
    }

    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }
    CANDIDATE_DELIMITERS[best]
}

/// Serializes a table to canonical comma-separated bytes.
///
/// The header line is fully quoted when a header contains another candidate
/// delimiter, so sniffing the written bytes still picks the comma.
pub fn write_csv(table: &TabularPreview) -> Result<Vec<u8>, IngestError> {
    let header_style = if table.headers.iter().any(|h| has_foreign_delimiter(h)) {
        QuoteStyle::Always
    } else {
        QuoteStyle::Necessary
    };
    let mut header_writer = WriterBuilder::new()
        .quote_style(header_style)
        .from_writer(Vec::new());
    header_writer.write_record(&table.headers)?;
    let buffer = header_writer
        .into_inner()
        .map_err(|e| IngestError::Serialize(e.to_string()))?;

    let mut writer = WriterBuilder::new().flexible(true).from_writer(buffer);
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| IngestError::Serialize(e.to_string()))
}

fn has_foreign_delimiter(field: &str) -> bool {
    field
        .bytes()
        .any(|b| b != b',' && CANDIDATE_DELIMITERS.contains(&b))
}
