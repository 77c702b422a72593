// ============================================================
// CSV PARSER
// ============================================================
// Parse uploaded batch files into raw records, with encoding and
// delimiter detection

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1258;
use tracing::{debug, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::record::RawRecord;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV parser for batch uploads. The delimiter is detected from the
/// content and values are trimmed.
pub struct CsvParser {
    /// Whether the first line names the columns. Without a header,
    /// columns map to the model schema by position.
    has_header: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { has_header: true }
    }
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Parse uploaded bytes, decoding them first
    pub fn parse_bytes(&self, bytes: &[u8], schema: &[&str]) -> Result<Vec<RawRecord>> {
        let content = decode(bytes);
        self.parse_content(&content, schema)
    }

    /// Parse CSV text. `schema` names the columns of a headerless file.
    pub fn parse_content(&self, content: &str, schema: &[&str]) -> Result<Vec<RawRecord>> {
        let delimiter = Self::detect_delimiter(content);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .has_headers(self.has_header)
            .flexible(true)
            .from_reader(content.as_bytes());

        let columns: Vec<String> = if self.has_header {
            reader
                .headers()
                .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
                .iter()
                .map(|h| h.trim().to_string())
                .collect()
        } else {
            schema.iter().map(|field| field.to_string()).collect()
        };

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;

            if is_blank(&record) {
                continue;
            }
            if record.len() > columns.len() {
                warn!(
                    row = index + 1,
                    fields = record.len(),
                    columns = columns.len(),
                    "Extra CSV fields ignored"
                );
            }

            rows.push(Self::parse_row(&columns, &record));
        }

        debug!(rows = rows.len(), delimiter = %(delimiter as char), "Parsed CSV content");
        Ok(rows)
    }

    fn parse_row(columns: &[String], record: &StringRecord) -> RawRecord {
        let mut row = RawRecord::new();
        for (column, value) in columns.iter().zip(record.iter()) {
            if column.is_empty() {
                continue;
            }
            row.insert(column.clone(), value);
        }
        row
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<&str> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(10)
            .collect();

        if sample_lines.is_empty() {
            return b',';
        }

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        for delimiter in candidates {
            let counts: Vec<f32> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count() as f32)
                .collect();

            // Frequent and consistent across lines wins
            let avg = counts.iter().sum::<f32>() / counts.len() as f32;
            let variance =
                counts.iter().map(|&x| (x - avg).powi(2)).sum::<f32>() / counts.len() as f32;
            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|value| value.trim().is_empty())
}

/// Decode an upload as UTF-8 (BOM stripped), falling back to Windows-1258,
/// the usual code page of Vietnamese spreadsheet exports.
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(content) => content.to_string(),
        Err(_) => {
            warn!("Upload is not valid UTF-8, decoding as Windows-1258");
            let (content, _, _) = WINDOWS_1258.decode(bytes);
            content.into_owned()
        }
    }
}
