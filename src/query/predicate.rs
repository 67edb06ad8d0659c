use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::models::{NumericField, Observation};
use crate::utils::constants::FIELD_TIMESTAMP;

/// One inclusive range constraint. A clause always carries at least one bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Timestamp {
        gte: Option<DateTime<Utc>>,
        lte: Option<DateTime<Utc>>,
    },
    Numeric {
        field: NumericField,
        gte: Option<f64>,
        lte: Option<f64>,
    },
}

impl Clause {
    pub fn timestamp(gte: Option<DateTime<Utc>>, lte: Option<DateTime<Utc>>) -> Option<Self> {
        (gte.is_some() || lte.is_some()).then_some(Clause::Timestamp { gte, lte })
    }

    pub fn numeric(field: NumericField, gte: Option<f64>, lte: Option<f64>) -> Option<Self> {
        (gte.is_some() || lte.is_some()).then_some(Clause::Numeric { field, gte, lte })
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            Clause::Timestamp { .. } => FIELD_TIMESTAMP,
            Clause::Numeric { field, .. } => field.as_str(),
        }
    }

    /// The field must be present and within both bounds
    pub fn matches(&self, observation: &Observation) -> bool {
        match self {
            Clause::Timestamp { gte, lte } => observation
                .timestamp
                .is_some_and(|ts| within(ts, *gte, *lte)),
            Clause::Numeric { field, gte, lte } => field
                .value(observation)
                .is_some_and(|v| within(v, *gte, *lte)),
        }
    }

    fn to_document(&self) -> Value {
        let mut cond = Map::new();
        match self {
            Clause::Timestamp { gte, lte } => {
                let render = |ts: &DateTime<Utc>| {
                    json!(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                };
                if let Some(gte) = gte {
                    cond.insert("$gte".into(), render(gte));
                }
                if let Some(lte) = lte {
                    cond.insert("$lte".into(), render(lte));
                }
            }
            Clause::Numeric { gte, lte, .. } => {
                if let Some(gte) = gte {
                    cond.insert("$gte".into(), json!(gte));
                }
                if let Some(lte) = lte {
                    cond.insert("$lte".into(), json!(lte));
                }
            }
        }
        Value::Object(cond)
    }
}

fn within<T: PartialOrd>(value: T, gte: Option<T>, lte: Option<T>) -> bool {
    gte.map_or(true, |lo| value >= lo) && lte.map_or(true, |hi| value <= hi)
}

/// A conjunction of range clauses, at most one per field.
///
/// An empty predicate matches every observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Matches everything
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_clauses(clauses: impl IntoIterator<Item = Clause>) -> Self {
        let mut predicate = Self::default();
        for clause in clauses {
            predicate = predicate.and(clause);
        }
        predicate
    }

    /// Add a clause, replacing any existing clause on the same field
    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.retain(|c| c.field_name() != clause.field_name());
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_unconstrained(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, observation: &Observation) -> bool {
        self.clauses.iter().all(|c| c.matches(observation))
    }

    /// Timestamp bounds, if the predicate constrains the timestamp
    pub fn timestamp_bounds(&self) -> Option<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Timestamp { gte, lte } => Some((*gte, *lte)),
            Clause::Numeric { .. } => None,
        })
    }

    /// Document-store filter form, e.g. `{"temperature": {"$gte": 10.0}}`.
    /// Unconstrained fields do not appear at all.
    pub fn to_document(&self) -> Value {
        let doc: Map<String, Value> = self
            .clauses
            .iter()
            .map(|c| (c.field_name().to_string(), c.to_document()))
            .collect();
        Value::Object(doc)
    }
}
