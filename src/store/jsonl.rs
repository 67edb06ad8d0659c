use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::error::{ProcessingError, Result};
use crate::models::Observation;
use crate::query::{Pagination, Predicate};
use crate::store::{IndexField, MemoryStore, RecordStore};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;

/// A [`MemoryStore`] persisted as an append-only JSON Lines file, one
/// observation document per line, so separate ETL and serve processes share data.
pub struct JsonlStore {
    path: PathBuf,
    memory: MemoryStore,
    writer: Mutex<File>,
}

impl JsonlStore {
    /// Load existing documents and open the file for appending.
    /// Fails if the file cannot be created, read, or contains a malformed line.
    pub fn open(path: &Path) -> Result<Self> {
        let unavailable = |reason: String| ProcessingError::StoreUnavailable {
            location: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
        }

        let documents = if path.exists() {
            load_documents(path).map_err(|e| unavailable(e.to_string()))?
        } else {
            Vec::new()
        };

        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| unavailable(e.to_string()))?;

        info!(path = %path.display(), documents = documents.len(), "opened JSON Lines store");

        Ok(Self {
            path: path.to_path_buf(),
            memory: MemoryStore::with_documents(documents),
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load_documents(path: &Path) -> Result<Vec<Observation>> {
    let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, File::open(path)?);
    let mut documents = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc = serde_json::from_str(&line).map_err(|e| {
            ProcessingError::InvalidFormat(format!("line {}: {}", line_number + 1, e))
        })?;
        documents.push(doc);
    }

    Ok(documents)
}

impl RecordStore for JsonlStore {
    fn insert_many(&self, observations: Vec<Observation>) -> Result<usize> {
        if observations.is_empty() {
            return Ok(0);
        }

        // Serialize the whole batch before touching the file so an encoding
        // failure appends nothing
        let mut buffer = Vec::with_capacity(observations.len() * 128);
        for observation in &observations {
            serde_json::to_writer(&mut buffer, observation)?;
            buffer.push(b'\n');
        }

        let mut file = self
            .writer
            .lock()
            .map_err(|_| ProcessingError::Store("JSON Lines writer lock poisoned".to_string()))?;
        file.write_all(&buffer)?;
        file.sync_data()?;

        debug!(path = %self.path.display(), count = observations.len(), "appended documents");
        self.memory.insert_many(observations)
    }

    fn find(&self, predicate: &Predicate, page: Pagination) -> Result<Vec<Observation>> {
        self.memory.find(predicate, page)
    }

    fn count(&self, predicate: &Predicate) -> Result<usize> {
        self.memory.count(predicate)
    }

    fn create_index(&self, field: IndexField) -> Result<()> {
        self.memory.create_index(field)
    }

    fn describe(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }
}
