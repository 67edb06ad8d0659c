use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProcessingError;
use crate::models::Observation;
use crate::utils::constants::{
    FIELD_LATITUDE, FIELD_LONGITUDE, FIELD_ODO, FIELD_SALINITY, FIELD_TEMPERATURE,
};

/// Numeric fields carried by an [`Observation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericField {
    Temperature,
    Salinity,
    Odo,
    Latitude,
    Longitude,
}

impl NumericField {
    /// Every numeric field, in canonical column order
    pub const ALL: [NumericField; 5] = [
        NumericField::Temperature,
        NumericField::Salinity,
        NumericField::Odo,
        NumericField::Latitude,
        NumericField::Longitude,
    ];

    /// Sensor measurements: cleaned during ETL and summarized by the stats engine
    pub const MEASUREMENTS: [NumericField; 3] = [
        NumericField::Temperature,
        NumericField::Salinity,
        NumericField::Odo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NumericField::Temperature => FIELD_TEMPERATURE,
            NumericField::Salinity => FIELD_SALINITY,
            NumericField::Odo => FIELD_ODO,
            NumericField::Latitude => FIELD_LATITUDE,
            NumericField::Longitude => FIELD_LONGITUDE,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn value(&self, observation: &Observation) -> Option<f64> {
        match self {
            NumericField::Temperature => observation.temperature,
            NumericField::Salinity => observation.salinity,
            NumericField::Odo => observation.odo,
            NumericField::Latitude => observation.latitude,
            NumericField::Longitude => observation.longitude,
        }
    }

    pub fn is_measurement(&self) -> bool {
        Self::MEASUREMENTS.contains(self)
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumericField {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| ProcessingError::InvalidFormat(format!("unknown field '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_round_trip() {
        for field in NumericField::ALL {
            assert_eq!(NumericField::parse(field.as_str()), Some(field));
        }
        assert_eq!("odo".parse::<NumericField>().unwrap(), NumericField::Odo);
        assert!("Temperature (c)".parse::<NumericField>().is_err());
    }

    #[test]
    fn test_measurements_exclude_location() {
        assert!(NumericField::Salinity.is_measurement());
        assert!(!NumericField::Latitude.is_measurement());
        assert!(!NumericField::Longitude.is_measurement());
    }
}
