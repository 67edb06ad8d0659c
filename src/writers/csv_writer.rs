use crate::error::Result;
use crate::models::{RawTable, RawValue};
use chrono::SecondsFormat;
use std::fs;
use std::path::Path;

/// Writes normalized tables back out as CSV
pub struct CleanedCsvWriter;

impl CleanedCsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the header and every row; null cells are left empty
    pub fn write_table(&self, table: &RawTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(render_cell))?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for CleanedCsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn render_cell(value: &RawValue) -> String {
    match value {
        RawValue::Null => String::new(),
        RawValue::Text(s) => s.clone(),
        RawValue::Number(v) => v.to_string(),
        RawValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_write_table() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("cleaned").join("out.csv");
        let columns = vec!["temperature".into(), "timestamp".into(), "notes".into()];
        let mut table = RawTable::new(columns);
        table.push_row(vec![
            RawValue::Number(21.5),
            RawValue::Timestamp(Utc.with_ymd_and_hms(2021, 10, 17, 14, 5, 9).unwrap()),
            RawValue::Text("calm, clear".into()),
        ]);
        table.push_row(vec![RawValue::Null, RawValue::Null, RawValue::Null]);

        CleanedCsvWriter::new().write_table(&table, &path)?;

        let written = fs::read_to_string(&path)?;
        assert_eq!(
            written,
            "temperature,timestamp,notes\n21.5,2021-10-17T14:05:09Z,\"calm, clear\"\n,,\n"
        );
        Ok(())
    }
}
