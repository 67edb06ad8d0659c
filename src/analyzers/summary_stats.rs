use crate::models::{NumericField, Observation};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate statistics for one numeric field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

/// Result of summarizing a set of observations.
///
/// `NoData` means the input was empty; `Fields` may still be empty when
/// observations exist but none carries a valid value for any field.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    NoData,
    Fields(BTreeMap<NumericField, FieldSummary>),
}

impl Summary {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Summary::NoData)
    }

    pub fn field(&self, field: NumericField) -> Option<&FieldSummary> {
        match self {
            Summary::NoData => None,
            Summary::Fields(fields) => fields.get(&field),
        }
    }

    /// Plain-text table for terminal output
    pub fn detailed_summary(&self) -> String {
        let fields = match self {
            Summary::NoData => return "No data".to_string(),
            Summary::Fields(fields) if fields.is_empty() => {
                return "No valid measurements".to_string()
            }
            Summary::Fields(fields) => fields,
        };

        let mut out = format!(
            "{:<12} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "field", "count", "mean", "min", "p25", "p50", "p75", "max"
        );
        for (field, s) in fields {
            out.push_str(&format!(
                "{:<12} {:>8} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}\n",
                field.as_str(),
                s.count,
                s.mean,
                s.min,
                s.p25,
                s.p50,
                s.p75,
                s.max
            ));
        }
        out
    }
}

/// Computes per-field summary statistics over observation snapshots
pub struct SummaryStatistics {
    fields: Vec<NumericField>,
}

impl SummaryStatistics {
    pub fn new() -> Self {
        Self {
            fields: NumericField::MEASUREMENTS.to_vec(),
        }
    }

    pub fn with_fields(fields: Vec<NumericField>) -> Self {
        Self { fields }
    }

    pub fn summarize(&self, observations: &[Observation]) -> Summary {
        if observations.is_empty() {
            return Summary::NoData;
        }

        let fields = self
            .fields
            .iter()
            .filter_map(|field| {
                let values: Vec<f64> = observations.iter().filter_map(|o| field.value(o)).collect();
                summarize_values(&values).map(|s| (*field, s))
            })
            .collect();

        Summary::Fields(fields)
    }
}

impl Default for SummaryStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Summarize a numeric sequence, ignoring non-finite values.
/// Returns `None` when no finite value remains.
pub fn summarize_values(values: &[f64]) -> Option<FieldSummary> {
    let sorted = sorted_finite(values.iter().copied());
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

    Some(FieldSummary {
        count: sorted.len(),
        mean,
        min,
        max,
        p25: quantile_sorted(&sorted, 0.25)?,
        p50: quantile_sorted(&sorted, 0.50)?,
        p75: quantile_sorted(&sorted, 0.75)?,
    })
}

/// Collect finite values in ascending order
pub fn sorted_finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of an ascending slice by linear interpolation between closest ranks
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }

    let pos = q * (sorted.len() as f64 - 1.0);
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    let lo = sorted[idx];
    let hi = sorted[(idx + 1).min(sorted.len() - 1)];
    Some((lo + (hi - lo) * frac).min(hi))
}

/// Population mean and standard deviation (denominator N) of finite values
pub fn population_mean_std(values: &[f64]) -> Option<(f64, f64)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let first = *finite.first()?;
    // rounding in the mean must not invent spread in a constant sequence
    if finite.iter().all(|v| *v == first) {
        return Some((first, 0.0));
    }

    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn obs(temperature: Option<f64>, salinity: Option<f64>) -> Observation {
        Observation {
            temperature,
            salinity,
            ..Default::default()
        }
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&sorted, 0.75), Some(3.25));
        assert_eq!(quantile_sorted(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[5.0], 0.9), Some(5.0));
    }

    #[test]
    fn test_population_std() {
        let (mean, std) = population_mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(mean, 5.0);
        assert_eq!(std, 2.0);
        assert_eq!(population_mean_std(&[f64::NAN]), None);
        assert_eq!(population_mean_std(&[0.1, 0.1, 0.1]), Some((0.1, 0.0)));
    }

    #[test]
    fn test_summarize_counts_valid_values_only() {
        let observations = vec![
            obs(Some(10.0), None),
            obs(None, None),
            obs(Some(20.0), Some(35.0)),
            obs(Some(30.0), None),
        ];

        let summary = SummaryStatistics::new().summarize(&observations);

        let temp = summary.field(NumericField::Temperature).unwrap();
        assert_eq!(
            temp,
            &FieldSummary {
                count: 3,
                mean: 20.0,
                min: 10.0,
                max: 30.0,
                p25: 15.0,
                p50: 20.0,
                p75: 25.0,
            }
        );
        assert_eq!(summary.field(NumericField::Salinity).unwrap().count, 1);
        // odo never appears and is omitted rather than zero-filled
        assert!(summary.field(NumericField::Odo).is_none());
    }

    #[test]
    fn test_empty_input_is_no_data() {
        assert_eq!(SummaryStatistics::new().summarize(&[]), Summary::NoData);
    }

    #[test]
    fn test_all_fields_missing_is_not_no_data() {
        let summary = SummaryStatistics::new().summarize(&[Observation::default()]);
        assert_eq!(summary, Summary::Fields(BTreeMap::new()));
        assert!(!summary.is_no_data());
    }

    #[test]
    fn test_detailed_summary_lists_fields() {
        let summary = SummaryStatistics::new().summarize(&[obs(Some(1.0), Some(2.0))]);
        let text = summary.detailed_summary();
        assert!(text.contains("temperature"));
        assert!(text.contains("salinity"));
        assert!(!text.contains("odo"));
    }

    proptest! {
        #[test]
        fn prop_summary_is_ordered(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)) {
            let s = summarize_values(&values).unwrap();
            prop_assert!(s.min <= s.p25);
            prop_assert!(s.p25 <= s.p50);
            prop_assert!(s.p50 <= s.p75);
            prop_assert!(s.p75 <= s.max);
            prop_assert_eq!(s.count, values.len());
        }

        #[test]
        fn prop_count_ignores_missing(
            values in prop::collection::vec(prop::option::of(-100.0f64..100.0), 1..100)
        ) {
            let observations: Vec<Observation> = values.iter().map(|v| obs(*v, None)).collect();
            let expected = values.iter().filter(|v| v.is_some()).count();

            let summary = SummaryStatistics::new().summarize(&observations);
            let count = summary.field(NumericField::Temperature).map_or(0, |s| s.count);
            prop_assert_eq!(count, expected);
        }
    }
}
