use crate::models::{NumericField, Observation, RawTable, RawValue};
use crate::utils::constants::{FIELD_ALIASES, FIELD_DATE, FIELD_TIME, FIELD_TIMESTAMP};
use tracing::debug;

/// Where the `timestamp` column of a normalized table came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampSource {
    /// A `timestamp` column was already present
    Existing,
    /// Built from separate date and time columns
    DateTime { date: String, time: String },
    /// Parsed from the first column whose name mentions a date or time
    Column(String),
    /// No usable column; the table has no timestamp
    Absent,
}

/// Maps heterogeneous source columns onto the canonical schema
pub struct ColumnNormalizer;

impl ColumnNormalizer {
    pub fn new() -> Self {
        Self
    }

    fn canonical_name<'a>(&self, column: &'a str) -> &'a str {
        FIELD_ALIASES
            .iter()
            .find(|(alias, _)| *alias == column)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(column)
    }

    /// Rename aliased columns, derive `timestamp`, and coerce numeric fields.
    ///
    /// Never fails: unparseable cells become nulls and rows are kept.
    pub fn normalize(&self, table: &RawTable) -> RawTable {
        self.normalize_with_source(table).0
    }

    pub fn normalize_with_source(&self, table: &RawTable) -> (RawTable, TimestampSource) {
        let original_columns = table.columns.clone();
        let mut out = RawTable {
            columns: table
                .columns
                .iter()
                .map(|c| self.canonical_name(c).to_string())
                .collect(),
            rows: table.rows.clone(),
        };

        let source = derive_timestamp(&mut out, &original_columns);

        for field in NumericField::ALL {
            let indices: Vec<usize> = out.column_indices(field.as_str()).collect();
            for row in &mut out.rows {
                for &idx in &indices {
                    row[idx] = row[idx]
                        .as_number()
                        .map(RawValue::Number)
                        .unwrap_or(RawValue::Null);
                }
            }
        }

        debug!(?source, columns = ?out.columns, "normalized table");
        (out, source)
    }

    /// Normalize and convert every row to an [`Observation`]
    pub fn to_observations(&self, table: &RawTable) -> Vec<Observation> {
        let normalized = self.normalize(table);
        observations_from_table(&normalized)
    }
}

impl Default for ColumnNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an already-normalized table to observations
pub fn observations_from_table(table: &RawTable) -> Vec<Observation> {
    table
        .rows
        .iter()
        .map(|row| Observation::from_row(&table.columns, row))
        .collect()
}

fn derive_timestamp(table: &mut RawTable, original_columns: &[String]) -> TimestampSource {
    let existing: Vec<usize> = table.column_indices(FIELD_TIMESTAMP).collect();
    if !existing.is_empty() {
        for row in &mut table.rows {
            for &idx in &existing {
                row[idx] = to_timestamp_cell(row[idx].as_timestamp());
            }
        }
        return TimestampSource::Existing;
    }

    if let Some((date_idx, time_idx)) = find_date_time_pair(table, original_columns) {
        let source = TimestampSource::DateTime {
            date: table.columns[date_idx].clone(),
            time: table.columns[time_idx].clone(),
        };
        let values: Vec<RawValue> = table
            .rows
            .iter()
            .map(|row| {
                let joined = match (row[date_idx].as_text(), row[time_idx].as_text()) {
                    (Some(date), Some(time)) => RawValue::Text(format!("{} {}", date, time)),
                    _ => RawValue::Null,
                };
                to_timestamp_cell(joined.as_timestamp())
            })
            .collect();
        append_column(table, values);
        return source;
    }

    let candidate = table.columns.iter().position(|c| {
        let lower = c.to_lowercase();
        lower.contains("time") || lower.contains("date")
    });

    if let Some(idx) = candidate {
        let source = TimestampSource::Column(table.columns[idx].clone());
        let values: Vec<RawValue> = table
            .rows
            .iter()
            .map(|row| to_timestamp_cell(row[idx].as_timestamp()))
            .collect();
        append_column(table, values);
        return source;
    }

    TimestampSource::Absent
}

/// Canonical `date`/`time` first, then the capitalized originals
fn find_date_time_pair(table: &RawTable, original_columns: &[String]) -> Option<(usize, usize)> {
    if let (Some(d), Some(t)) = (table.column_index(FIELD_DATE), table.column_index(FIELD_TIME)) {
        return Some((d, t));
    }

    let date = original_columns.iter().position(|c| c == "Date");
    let time = original_columns.iter().position(|c| c == "Time");
    date.zip(time)
}

fn to_timestamp_cell(value: Option<chrono::DateTime<chrono::Utc>>) -> RawValue {
    value.map(RawValue::Timestamp).unwrap_or(RawValue::Null)
}

fn append_column(table: &mut RawTable, values: Vec<RawValue>) {
    table.columns.push(FIELD_TIMESTAMP.to_string());
    for (row, value) in table.rows.iter_mut().zip(values) {
        row.push(value);
    }
}
