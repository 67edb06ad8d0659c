//! Record store contract and adapters.
//!
//! The store handle is opened once by the entry point and passed down as an
//! `Arc<dyn RecordStore>`. Adapters serialize their own operations; callers
//! hold no locks of their own.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;
use crate::models::Observation;
use crate::query::{Pagination, Predicate};
use std::sync::Arc;
use tracing::info;

/// Fields a store may index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexField {
    Timestamp,
}

pub trait RecordStore: Send + Sync {
    /// Insert cleaned observations, returning how many were stored
    fn insert_many(&self, observations: Vec<Observation>) -> Result<usize>;

    /// Matching observations in insertion order, after skip and limit
    fn find(&self, predicate: &Predicate, page: Pagination) -> Result<Vec<Observation>>;

    fn count(&self, predicate: &Predicate) -> Result<usize>;

    /// Index hint; affects lookup speed only, never results
    fn create_index(&self, field: IndexField) -> Result<()>;

    /// Human-readable location for logs
    fn describe(&self) -> String;

    fn find_all(&self, predicate: &Predicate) -> Result<Vec<Observation>> {
        self.find(predicate, Pagination::unbounded())
    }
}

/// Open the configured store and ensure the timestamp index.
///
/// Failure here is fatal for the caller: nothing can be served without a store.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(JsonlStore::open(&config.path)?),
    };
    store.create_index(IndexField::Timestamp)?;

    info!(store = %store.describe(), "record store ready");
    Ok(store)
}
