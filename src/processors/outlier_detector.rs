use crate::analyzers::summary_stats::{population_mean_std, quantile_sorted, sorted_finite};
use crate::models::{NumericField, Observation};
use crate::utils::constants::{
    BATCH_ZSCORE_THRESHOLD, DEFAULT_OUTLIER_FIELD, DEFAULT_OUTLIER_K, PARAM_FIELD, PARAM_K,
    PARAM_METHOD,
};
use crate::utils::parsing::parse_finite;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    #[default]
    Iqr,
    ZScore,
}

impl OutlierMethod {
    /// `z` and `zscore` (any case) select z-score; everything else is IQR
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "z" | "zscore" => OutlierMethod::ZScore,
            _ => OutlierMethod::Iqr,
        }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlierMethod::Iqr => f.write_str("iqr"),
            OutlierMethod::ZScore => f.write_str("zscore"),
        }
    }
}

/// Classifies each value of a numeric sequence as outlier or inlier.
///
/// Missing and non-finite values take no part in the statistics and are
/// never flagged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierDetector {
    method: OutlierMethod,
    k: f64,
}

impl OutlierDetector {
    pub fn new(method: OutlierMethod, k: f64) -> Self {
        Self { method, k }
    }

    pub fn iqr(k: f64) -> Self {
        Self::new(OutlierMethod::Iqr, k)
    }

    pub fn zscore(k: f64) -> Self {
        Self::new(OutlierMethod::ZScore, k)
    }

    pub fn method(&self) -> OutlierMethod {
        self.method
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    /// Outlier mask aligned with `values`
    pub fn flag(&self, values: &[Option<f64>]) -> Vec<bool> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();

        let Some(fence) = self.fence(&present) else {
            return vec![false; values.len()];
        };

        values
            .iter()
            .map(|v| match v {
                Some(v) if v.is_finite() => fence.excludes(*v, self.k),
                _ => false,
            })
            .collect()
    }

    /// Mask for one field across a set of observations
    pub fn flag_field(&self, observations: &[Observation], field: NumericField) -> Vec<bool> {
        let values: Vec<Option<f64>> = observations.iter().map(|o| field.value(o)).collect();
        self.flag(&values)
    }

    /// `None` when nothing can be flagged: no finite values, or zero spread for z-score
    fn fence(&self, values: &[f64]) -> Option<Fence> {
        match self.method {
            OutlierMethod::Iqr => {
                let sorted = sorted_finite(values.iter().copied());
                let q1 = quantile_sorted(&sorted, 0.25)?;
                let q3 = quantile_sorted(&sorted, 0.75)?;
                let iqr = q3 - q1;
                Some(Fence::Range {
                    lower: q1 - self.k * iqr,
                    upper: q3 + self.k * iqr,
                })
            }
            OutlierMethod::ZScore => {
                let (mean, std) = population_mean_std(values)?;
                if std == 0.0 || !std.is_finite() {
                    return None;
                }
                Some(Fence::Standardized { mean, std })
            }
        }
    }
}

enum Fence {
    Range { lower: f64, upper: f64 },
    Standardized { mean: f64, std: f64 },
}

impl Fence {
    fn excludes(&self, value: f64, k: f64) -> bool {
        match *self {
            Fence::Range { lower, upper } => value < lower || value > upper,
            Fence::Standardized { mean, std } => ((value - mean) / std).abs() > k,
        }
    }
}

/// Batch ETL cleaning policy: z-score at a fixed threshold of 3.0 on every
/// configured field, rows kept only if they are inliers on all of them.
///
/// Deliberately separate from [`OutlierQuery`]; the query-time method and `k`
/// never influence batch cleaning.
#[derive(Debug, Clone)]
pub struct CleanPolicy {
    fields: Vec<NumericField>,
}

/// Result of applying a [`CleanPolicy`]
#[derive(Debug, Clone, PartialEq)]
pub struct CleanMask {
    pub keep: Vec<bool>,
    pub removed_by_field: BTreeMap<NumericField, usize>,
}

impl CleanMask {
    pub fn kept(&self) -> usize {
        self.keep.iter().filter(|k| **k).count()
    }

    pub fn removed(&self) -> usize {
        self.keep.len() - self.kept()
    }
}

impl CleanPolicy {
    pub fn new() -> Self {
        Self {
            fields: NumericField::MEASUREMENTS.to_vec(),
        }
    }

    pub fn with_fields(fields: Vec<NumericField>) -> Self {
        Self { fields }
    }

    pub fn threshold(&self) -> f64 {
        BATCH_ZSCORE_THRESHOLD
    }

    pub fn fields(&self) -> &[NumericField] {
        &self.fields
    }

    pub fn mask(&self, observations: &[Observation]) -> CleanMask {
        let detector = OutlierDetector::zscore(BATCH_ZSCORE_THRESHOLD);
        let mut keep = vec![true; observations.len()];
        let mut removed_by_field = BTreeMap::new();

        for field in &self.fields {
            let flags = detector.flag_field(observations, *field);
            let flagged = flags.iter().filter(|f| **f).count();
            if flagged > 0 {
                removed_by_field.insert(*field, flagged);
            }
            for (k, flagged) in keep.iter_mut().zip(flags) {
                *k &= !flagged;
            }
        }

        CleanMask {
            keep,
            removed_by_field,
        }
    }

    /// Keep only rows that are inliers on every field
    pub fn clean(&self, observations: Vec<Observation>) -> (Vec<Observation>, CleanMask) {
        let mask = self.mask(&observations);
        let cleaned = observations
            .into_iter()
            .zip(&mask.keep)
            .filter_map(|(o, keep)| keep.then_some(o))
            .collect();
        (cleaned, mask)
    }
}

impl Default for CleanPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Ad-hoc outlier request: one field, caller-chosen method and `k`
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierQuery {
    pub field: String,
    pub method: OutlierMethod,
    pub k: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutlierOutcome {
    Flagged {
        items: Vec<Observation>,
        total: usize,
    },
    /// The field is not a known numeric field, or no observation carries it
    UnknownField(String),
}

impl OutlierQuery {
    pub fn new(field: impl Into<String>, method: OutlierMethod, k: f64) -> Self {
        Self {
            field: field.into(),
            method,
            k,
        }
    }

    /// Read `field`, `method`, and `k` from query parameters.
    /// Malformed or non-positive `k` falls back to the default.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let field = params
            .get(PARAM_FIELD)
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_OUTLIER_FIELD.to_string());
        let method = params
            .get(PARAM_METHOD)
            .map(|m| OutlierMethod::parse_lenient(m))
            .unwrap_or_default();
        let k = params
            .get(PARAM_K)
            .and_then(|k| parse_finite(k))
            .filter(|k| *k > 0.0)
            .unwrap_or(DEFAULT_OUTLIER_K);

        Self { field, method, k }
    }

    pub fn run(&self, observations: Vec<Observation>) -> OutlierOutcome {
        let Some(field) = NumericField::parse(&self.field) else {
            return OutlierOutcome::UnknownField(self.field.clone());
        };

        let total = observations.len();
        if total > 0 && observations.iter().all(|o| field.value(o).is_none()) {
            return OutlierOutcome::UnknownField(self.field.clone());
        }

        let detector = OutlierDetector::new(self.method, self.k);
        let flags = detector.flag_field(&observations, field);
        let items: Vec<Observation> = observations
            .into_iter()
            .zip(flags)
            .filter_map(|(o, flagged)| flagged.then_some(o))
            .collect();

        debug!(
            field = %field,
            method = %self.method,
            k = self.k,
            flagged = items.len(),
            total,
            "outlier query"
        );

        OutlierOutcome::Flagged { items, total }
    }
}

impl Default for OutlierQuery {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLIER_FIELD, OutlierMethod::Iqr, DEFAULT_OUTLIER_K)
    }
}
