use chrono::{DateTime, Utc};

use crate::utils::parsing::{parse_finite, parse_timestamp};

/// A single untyped cell from a source table
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Text(String),
    Number(f64),
    Timestamp(DateTime<Utc>),
}

impl RawValue {
    /// Build a cell from CSV text; blank cells become `Null`
    pub fn from_csv_field(field: &str) -> Self {
        if field.trim().is_empty() {
            RawValue::Null
        } else {
            RawValue::Text(field.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Coerce to a finite number, or `None`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) if v.is_finite() => Some(*v),
            RawValue::Text(s) => parse_finite(s),
            _ => None,
        }
    }

    /// Coerce to a UTC timestamp, or `None`
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            RawValue::Timestamp(ts) => Some(*ts),
            RawValue::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }

    /// Text rendering used when joining separate date and time columns
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Null => None,
            RawValue::Text(s) => Some(s.trim().to_string()),
            RawValue::Number(v) => Some(v.to_string()),
            RawValue::Timestamp(ts) => Some(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// A source table with arbitrary, ordered column names.
///
/// Each row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from sparse rows, taking columns in first-seen order.
    /// Cells a row does not mention are `Null`.
    pub fn from_records<K, V>(records: Vec<Vec<(K, V)>>) -> Self
    where
        K: Into<String>,
        V: Into<RawValue>,
    {
        let mut table = RawTable::default();
        let mut sparse = Vec::with_capacity(records.len());

        for record in records {
            let mut cells = Vec::with_capacity(record.len());
            for (key, value) in record {
                let key = key.into();
                let idx = match table.column_index(&key) {
                    Some(idx) => idx,
                    None => {
                        table.columns.push(key);
                        table.columns.len() - 1
                    }
                };
                cells.push((idx, value.into()));
            }
            sparse.push(cells);
        }

        for cells in sparse {
            let mut row = vec![RawValue::Null; table.columns.len()];
            for (idx, value) in cells {
                row[idx] = value;
            }
            table.rows.push(row);
        }

        table
    }

    /// Append a row, padding or truncating it to the column count
    pub fn push_row(&mut self, mut row: Vec<RawValue>) {
        row.resize(self.columns.len(), RawValue::Null);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Every position holding `name`; aliasing can map several source columns
    /// onto one canonical name
    pub fn column_indices<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.columns
            .iter()
            .enumerate()
            .filter(move |(_, c)| *c == name)
            .map(|(idx, _)| idx)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
