use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::NumericField;
use crate::query::predicate::{Clause, Predicate};
use crate::utils::constants::{
    DEFAULT_LIMIT, DEFAULT_SKIP, MAX_LIMIT, MAX_SKIP, MIN_LIMIT, PARAM_END, PARAM_LIMIT,
    PARAM_MAX_ODO, PARAM_MAX_SAL, PARAM_MAX_TEMP, PARAM_MIN_ODO, PARAM_MIN_SAL, PARAM_MIN_TEMP,
    PARAM_SKIP, PARAM_START,
};
use crate::utils::parsing::{parse_finite, parse_timestamp};

/// Query parameter names carrying each measurement field's bounds
const FIELD_PARAMS: [(NumericField, &str, &str); 3] = [
    (NumericField::Temperature, PARAM_MIN_TEMP, PARAM_MAX_TEMP),
    (NumericField::Salinity, PARAM_MIN_SAL, PARAM_MAX_SAL),
    (NumericField::Odo, PARAM_MIN_ODO, PARAM_MAX_ODO),
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// User-facing range filter; every bound is optional and inclusive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub temperature: FieldRange,
    pub salinity: FieldRange,
    pub odo: FieldRange,
}

impl RangeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read bounds from query parameters. Malformed values count as absent.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let timestamp = |key: &str| params.get(key).and_then(|v| parse_timestamp(v));
        let number = |key: &str| params.get(key).and_then(|v| parse_finite(v));

        let mut filter = RangeFilter {
            start: timestamp(PARAM_START),
            end: timestamp(PARAM_END),
            ..Default::default()
        };
        for (field, min_key, max_key) in FIELD_PARAMS {
            if let Some(range) = filter.range_mut(field) {
                *range = FieldRange::new(number(min_key), number(max_key));
            }
        }
        filter
    }

    pub fn with_time_window(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_range(mut self, field: NumericField, min: Option<f64>, max: Option<f64>) -> Self {
        if let Some(range) = self.range_mut(field) {
            *range = FieldRange::new(min, max);
        }
        self
    }

    pub fn range(&self, field: NumericField) -> Option<&FieldRange> {
        match field {
            NumericField::Temperature => Some(&self.temperature),
            NumericField::Salinity => Some(&self.salinity),
            NumericField::Odo => Some(&self.odo),
            NumericField::Latitude | NumericField::Longitude => None,
        }
    }

    fn range_mut(&mut self, field: NumericField) -> Option<&mut FieldRange> {
        match field {
            NumericField::Temperature => Some(&mut self.temperature),
            NumericField::Salinity => Some(&mut self.salinity),
            NumericField::Odo => Some(&mut self.odo),
            NumericField::Latitude | NumericField::Longitude => None,
        }
    }

    /// Translate to a store predicate; fields without bounds contribute no clause
    pub fn to_predicate(&self) -> Predicate {
        let time = Clause::timestamp(self.start, self.end);
        let fields = NumericField::MEASUREMENTS.into_iter().filter_map(|field| {
            self.range(field)
                .and_then(|r| Clause::numeric(field, r.min, r.max))
        });

        Predicate::from_clauses(time.into_iter().chain(fields))
    }
}

/// Result window applied after filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: usize,
    skip: usize,
}

impl Pagination {
    /// Clamp `limit` to [1, 1000] and `skip` to [0, 10_000_000]
    pub fn new(limit: usize, skip: usize) -> Self {
        Self {
            limit: limit.clamp(MIN_LIMIT, MAX_LIMIT),
            skip: skip.min(MAX_SKIP),
        }
    }

    /// No window at all; used for whole-set reads
    pub fn unbounded() -> Self {
        Self {
            limit: usize::MAX,
            skip: 0,
        }
    }

    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let limit = parse_clamped(params.get(PARAM_LIMIT), DEFAULT_LIMIT, MIN_LIMIT, MAX_LIMIT);
        let skip = parse_clamped(params.get(PARAM_SKIP), DEFAULT_SKIP, 0, MAX_SKIP);
        Self { limit, skip }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn skip(&self) -> usize {
        self.skip
    }

    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.limit).collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: DEFAULT_SKIP,
        }
    }
}

/// Integers may arrive signed or beyond any machine width and saturate to the
/// bounds; anything that is not an integer takes the default
fn parse_clamped(value: Option<&String>, default: usize, min: usize, max: usize) -> usize {
    let Some(text) = value.map(|v| v.trim()) else {
        return default;
    };
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return default;
    }
    if negative {
        return min;
    }
    digits.parse::<usize>().map_or(max, |n| n.clamp(min, max))
}
