use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{NumericField, RawValue};
use crate::utils::constants::FIELD_TIMESTAMP;

/// One timestamped sensor reading.
///
/// Every field is optional: a source export may lack any column, and cells
/// that fail to parse are stored as absent rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Observation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salinity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odo: Option<f64>,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Observation {
    pub fn new(timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, field: NumericField, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn set(&mut self, field: NumericField, value: Option<f64>) {
        let slot = match field {
            NumericField::Temperature => &mut self.temperature,
            NumericField::Salinity => &mut self.salinity,
            NumericField::Odo => &mut self.odo,
            NumericField::Latitude => &mut self.latitude,
            NumericField::Longitude => &mut self.longitude,
        };
        *slot = value;
    }

    pub fn get(&self, field: NumericField) -> Option<f64> {
        field.value(self)
    }

    /// Convert a row of a normalized table; columns outside the canonical
    /// schema are dropped. When several columns carry the same field, the
    /// first usable value wins.
    pub fn from_row(columns: &[String], row: &[RawValue]) -> Self {
        let mut observation = Observation::default();

        for (name, value) in columns.iter().zip(row) {
            if name == FIELD_TIMESTAMP {
                observation.timestamp = observation.timestamp.or_else(|| value.as_timestamp());
            } else if let Some(field) = NumericField::parse(name) {
                if observation.get(field).is_none() {
                    observation.set(field, value.as_number());
                }
            }
        }

        observation
    }

    /// True when latitude/longitude, if present, are valid coordinates
    pub fn has_valid_coordinates(&self) -> bool {
        self.validate().is_ok()
    }
}
