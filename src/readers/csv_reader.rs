use crate::error::{ProcessingError, Result};
use crate::models::{RawTable, RawValue};
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads sensor CSV exports into untyped [`RawTable`]s
pub struct CsvTableReader;

impl CsvTableReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a CSV file with a header row
    pub fn read_table(&self, path: &Path) -> Result<RawTable> {
        let bytes = fs::read(path)?;
        let text = decode_text(&bytes, path);
        let table = self.parse_table(&text)?;

        debug!(
            path = %path.display(),
            columns = table.columns.len(),
            rows = table.len(),
            "read raw table"
        );

        Ok(table)
    }

    /// Parse CSV text with a header row. Ragged rows are padded with nulls.
    pub fn parse_table(&self, text: &str) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b',')
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(ProcessingError::MissingData(
                "CSV input has no header row".to_string(),
            ));
        }

        let mut table = RawTable::new(columns);
        for record in reader.records() {
            let record = record?;
            let row = record.iter().map(RawValue::from_csv_field).collect();
            table.push_row(row);
        }

        Ok(table)
    }

    /// List `*.csv` files in a directory, sorted by path
    pub fn find_csv_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

            if path.is_file() && is_csv {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}

impl Default for CsvTableReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode as UTF-8 (BOM stripped), falling back to Windows-1252 for legacy exports
fn decode_text<'a>(bytes: &'a [u8], path: &Path) -> Cow<'a, str> {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text;
    }

    warn!(path = %path.display(), "input is not valid UTF-8, decoding as Windows-1252");
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text
}
