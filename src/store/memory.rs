use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ProcessingError, Result};
use crate::models::Observation;
use crate::query::{Pagination, Predicate};
use crate::store::{IndexField, RecordStore};

/// In-process document store
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    documents: Vec<Observation>,
    timestamp_index: Option<BTreeMap<DateTime<Utc>, Vec<usize>>>,
}

impl Inner {
    fn push(&mut self, observation: Observation) {
        let position = self.documents.len();
        if let (Some(index), Some(ts)) = (self.timestamp_index.as_mut(), observation.timestamp) {
            index.entry(ts).or_default().push(position);
        }
        self.documents.push(observation);
    }

    /// Documents that may match, in insertion order.
    /// Uses the timestamp index to narrow time-window scans when present.
    fn candidates<'a>(
        &'a self,
        predicate: &Predicate,
    ) -> Box<dyn Iterator<Item = &'a Observation> + 'a> {
        let bounds = predicate.timestamp_bounds();
        let (Some(index), Some((gte, lte))) = (&self.timestamp_index, bounds) else {
            return Box::new(self.documents.iter());
        };

        if let (Some(lo), Some(hi)) = (gte, lte) {
            if lo > hi {
                return Box::new(std::iter::empty());
            }
        }

        let lower = gte.map_or(Bound::Unbounded, Bound::Included);
        let upper = lte.map_or(Bound::Unbounded, Bound::Included);
        let mut positions: Vec<usize> = index
            .range((lower, upper))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        positions.sort_unstable();

        Box::new(positions.into_iter().map(move |p| &self.documents[p]))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<Observation>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.write() {
            for doc in documents {
                inner.push(doc);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.documents.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_index(&self, field: IndexField) -> bool {
        match field {
            IndexField::Timestamp => self
                .read()
                .map(|inner| inner.timestamp_index.is_some())
                .unwrap_or(false),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| ProcessingError::Store("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| ProcessingError::Store("memory store lock poisoned".to_string()))
    }
}

impl RecordStore for MemoryStore {
    fn insert_many(&self, observations: Vec<Observation>) -> Result<usize> {
        let inserted = observations.len();
        let mut inner = self.write()?;
        for observation in observations {
            inner.push(observation);
        }
        Ok(inserted)
    }

    fn find(&self, predicate: &Predicate, page: Pagination) -> Result<Vec<Observation>> {
        let inner = self.read()?;
        let matching = inner
            .candidates(predicate)
            .filter(|o| predicate.matches(o))
            .cloned();
        Ok(page.apply(matching))
    }

    fn count(&self, predicate: &Predicate) -> Result<usize> {
        let inner = self.read()?;
        let count = inner
            .candidates(predicate)
            .filter(|o| predicate.matches(o))
            .count();
        Ok(count)
    }

    fn create_index(&self, field: IndexField) -> Result<()> {
        match field {
            IndexField::Timestamp => {
                let mut inner = self.write()?;
                if inner.timestamp_index.is_some() {
                    return Ok(());
                }
                let mut index: BTreeMap<DateTime<Utc>, Vec<usize>> = BTreeMap::new();
                for (position, doc) in inner.documents.iter().enumerate() {
                    if let Some(ts) = doc.timestamp {
                        index.entry(ts).or_default().push(position);
                    }
                }
                inner.timestamp_index = Some(index);
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NumericField;
    use crate::query::{Clause, RangeFilter};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 10, 17, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn sample() -> Vec<Observation> {
        vec![
            Observation::new(Some(at(3))).with_value(NumericField::Temperature, 15.0),
            Observation::new(Some(at(1))).with_value(NumericField::Temperature, 25.0),
            Observation::new(None).with_value(NumericField::Temperature, 18.0),
            Observation::new(Some(at(2))),
            Observation::new(Some(at(1))).with_value(NumericField::Temperature, 12.0),
        ]
    }

    #[test]
    fn test_find_and_count_with_predicate() -> Result<()> {
        let store = MemoryStore::with_documents(sample());
        let predicate = RangeFilter::new()
            .with_range(NumericField::Temperature, Some(10.0), Some(20.0))
            .to_predicate();

        let found = store.find(&predicate, Pagination::default())?;

        let temps: Vec<_> = found.iter().map(|o| o.temperature).collect();
        assert_eq!(temps, vec![Some(15.0), Some(18.0), Some(12.0)]);
        assert_eq!(store.count(&predicate)?, 3);
        Ok(())
    }

    #[test]
    fn test_pagination_is_applied_after_filtering() -> Result<()> {
        let store = MemoryStore::with_documents(sample());

        let page = store.find(&Predicate::all(), Pagination::new(2, 1))?;

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].temperature, Some(25.0));
        assert_eq!(store.count(&Predicate::all())?, 5);
        Ok(())
    }

    #[test]
    fn test_index_does_not_change_results() -> Result<()> {
        let plain = MemoryStore::with_documents(sample());
        let indexed = MemoryStore::with_documents(sample());
        indexed.create_index(IndexField::Timestamp)?;
        assert!(indexed.has_index(IndexField::Timestamp));

        let predicates = [
            Predicate::all(),
            Predicate::all().and(Clause::timestamp(Some(at(1)), Some(at(2))).unwrap()),
            Predicate::all().and(Clause::timestamp(None, Some(at(1))).unwrap()),
            Predicate::all().and(Clause::timestamp(Some(at(3)), Some(at(1))).unwrap()),
        ];
        for predicate in &predicates {
            assert_eq!(
                indexed.find_all(predicate)?,
                plain.find_all(predicate)?,
                "predicate {:?}",
                predicate
            );
        }
        Ok(())
    }

    #[test]
    fn test_index_tracks_later_inserts() -> Result<()> {
        let store = MemoryStore::new();
        store.create_index(IndexField::Timestamp)?;
        store.insert_many(sample())?;

        let window = Predicate::all().and(Clause::timestamp(Some(at(1)), Some(at(1))).unwrap());
        let found = store.find_all(&window)?;

        // insertion order is preserved within the window
        let temps: Vec<_> = found.iter().map(|o| o.temperature).collect();
        assert_eq!(temps, vec![Some(25.0), Some(12.0)]);
        Ok(())
    }

    #[test]
    fn test_empty_store() -> Result<()> {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.find_all(&Predicate::all())?.is_empty());
        assert_eq!(store.count(&Predicate::all())?, 0);
        assert_eq!(store.insert_many(Vec::new())?, 0);
        Ok(())
    }
}
