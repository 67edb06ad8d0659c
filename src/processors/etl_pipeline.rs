use crate::error::{ProcessingError, Result};
use crate::models::{NumericField, Observation, RawTable};
use crate::processors::column_normalizer::{
    observations_from_table, ColumnNormalizer, TimestampSource,
};
use crate::processors::outlier_detector::CleanPolicy;
use crate::readers::CsvTableReader;
use crate::store::RecordStore;
use crate::utils::filename::generate_cleaned_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::CleanedCsvWriter;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of cleaning one table
#[derive(Debug, Clone)]
pub struct CleanedBatch {
    /// Normalized table holding only the surviving rows
    pub table: RawTable,
    pub observations: Vec<Observation>,
    pub report: FileReport,
}

#[derive(Debug, Clone, Default)]
pub struct FileReport {
    pub source: Option<PathBuf>,
    pub rows_before: usize,
    pub rows_removed: usize,
    pub rows_remaining: usize,
    pub removed_by_field: BTreeMap<NumericField, usize>,
    pub coordinate_violations: usize,
    pub missing_timestamps: usize,
    pub timestamp_source: Option<TimestampSource>,
    pub cleaned_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct EtlSummary {
    pub files: Vec<FileReport>,
    pub inserted: usize,
}

impl EtlSummary {
    pub fn total_before(&self) -> usize {
        self.files.iter().map(|f| f.rows_before).sum()
    }

    pub fn total_removed(&self) -> usize {
        self.files.iter().map(|f| f.rows_removed).sum()
    }

    pub fn total_remaining(&self) -> usize {
        self.files.iter().map(|f| f.rows_remaining).sum()
    }

    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        for file in &self.files {
            let name = file
                .source
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<table>".to_string());
            summary.push_str(&format!("Processed: {}\n", name));
            summary.push_str(&format!("  Rows original:  {}\n", file.rows_before));
            summary.push_str(&format!("  Rows removed:   {}\n", file.rows_removed));
            for (field, removed) in &file.removed_by_field {
                summary.push_str(&format!("    {} outliers: {}\n", field, removed));
            }
            summary.push_str(&format!("  Rows remaining: {}\n", file.rows_remaining));
            if file.coordinate_violations > 0 {
                summary.push_str(&format!(
                    "  Invalid coordinates: {}\n",
                    file.coordinate_violations
                ));
            }
            if let Some(path) = &file.cleaned_path {
                summary.push_str(&format!("  Cleaned file saved: {}\n", path.display()));
            }
        }

        summary.push_str("\n=== ETL Summary ===\n");
        summary.push_str(&format!("Total rows originally: {}\n", self.total_before()));
        summary.push_str(&format!("Rows removed as outliers: {}\n", self.total_removed()));
        summary.push_str(&format!(
            "Rows remaining after cleaning: {}\n",
            self.total_remaining()
        ));
        summary.push_str(&format!("Documents inserted: {}\n", self.inserted));
        summary
    }
}

/// Batch job: read raw CSV exports, normalize, clean, export, and load
pub struct EtlPipeline {
    max_workers: usize,
    cleaned_dir: Option<PathBuf>,
    normalizer: ColumnNormalizer,
    policy: CleanPolicy,
}

impl EtlPipeline {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            cleaned_dir: None,
            normalizer: ColumnNormalizer::new(),
            policy: CleanPolicy::new(),
        }
    }

    /// Directory for cleaned CSV exports; `None` disables export
    pub fn with_cleaned_dir(mut self, cleaned_dir: Option<PathBuf>) -> Self {
        self.cleaned_dir = cleaned_dir;
        self
    }

    /// Normalize a table and drop rows that are outliers on any cleaned field
    pub fn clean_table(&self, raw: &RawTable) -> CleanedBatch {
        let (normalized, timestamp_source) = self.normalizer.normalize_with_source(raw);
        let observations = observations_from_table(&normalized);
        let mask = self.policy.mask(&observations);

        let mut kept_table = RawTable::new(normalized.columns.clone());
        let mut kept = Vec::with_capacity(mask.kept());
        for ((row, observation), keep) in normalized
            .rows
            .into_iter()
            .zip(observations)
            .zip(&mask.keep)
        {
            if *keep {
                kept_table.rows.push(row);
                kept.push(observation);
            }
        }

        let report = FileReport {
            rows_before: raw.len(),
            rows_removed: mask.removed(),
            rows_remaining: kept.len(),
            removed_by_field: mask.removed_by_field,
            coordinate_violations: kept.iter().filter(|o| !o.has_valid_coordinates()).count(),
            missing_timestamps: kept.iter().filter(|o| o.timestamp.is_none()).count(),
            timestamp_source: Some(timestamp_source),
            ..Default::default()
        };

        CleanedBatch {
            table: kept_table,
            observations: kept,
            report,
        }
    }

    /// Read, clean, and optionally export one CSV file
    pub fn process_file(&self, path: &Path) -> Result<CleanedBatch> {
        let raw = CsvTableReader::new().read_table(path)?;
        let mut batch = self.clean_table(&raw);
        batch.report.source = Some(path.to_path_buf());

        if let Some(dir) = &self.cleaned_dir {
            let out_path = generate_cleaned_filename(path, dir);
            CleanedCsvWriter::new().write_table(&batch.table, &out_path)?;
            batch.report.cleaned_path = Some(out_path);
        }

        if batch.report.coordinate_violations > 0 {
            warn!(
                path = %path.display(),
                count = batch.report.coordinate_violations,
                "rows with out-of-range coordinates"
            );
        }
        info!(
            path = %path.display(),
            before = batch.report.rows_before,
            removed = batch.report.rows_removed,
            remaining = batch.report.rows_remaining,
            "cleaned file"
        );

        Ok(batch)
    }

    /// Process every CSV in `raw_dir` and insert the cleaned rows.
    ///
    /// Files are read and cleaned in parallel; inserts happen afterwards,
    /// one file at a time in path order.
    pub fn run(
        &self,
        raw_dir: &Path,
        store: &dyn RecordStore,
        progress: Option<&ProgressReporter>,
    ) -> Result<EtlSummary> {
        let files = CsvTableReader::new().find_csv_files(raw_dir)?;
        if files.is_empty() {
            warn!(dir = %raw_dir.display(), "no CSV files found");
            return Ok(EtlSummary::default());
        }

        if let Some(p) = progress {
            p.set_message(&format!("Cleaning {} files...", files.len()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let batches: Result<Vec<CleanedBatch>> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let result = self.process_file(path);
                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    result
                })
                .collect()
        });

        if let Some(p) = progress {
            p.set_message("Loading cleaned records...");
        }

        let mut summary = EtlSummary::default();
        for batch in batches? {
            summary.inserted += store.insert_many(batch.observations)?;
            summary.files.push(batch.report);
        }

        if let Some(p) = progress {
            p.finish_with_message(&format!("Loaded {} records", summary.inserted));
        }

        Ok(summary)
    }
}

impl Default for EtlPipeline {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Predicate;
    use crate::store::MemoryStore;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn spike_csv() -> String {
        let mut body = String::from(
            "Date,Time,Temperature (c),Salinity (ppt),ODO mg/L,Latitude,Longitude\n",
        );
        for i in 0..20 {
            body.push_str(&format!(
                "10/17/2021,14:{:02}:00,{},{},{},25.7,-80.1\n",
                i,
                20.0 + (i % 3) as f64 * 0.1,
                35.0,
                6.0 + (i % 2) as f64 * 0.1
            ));
        }
        body.push_str("10/17/2021,14:59:00,1000,35.0,6.0,25.7,-80.1\n");
        body
    }

    #[test]
    fn test_clean_table_drops_spike_and_keeps_table_aligned() {
        let raw = CsvTableReader::new().parse_table(&spike_csv()).unwrap();

        let batch = EtlPipeline::new(1).clean_table(&raw);

        assert_eq!(batch.report.rows_before, 21);
        assert_eq!(batch.report.rows_removed, 1);
        assert_eq!(batch.report.rows_remaining, 20);
        assert_eq!(batch.table.len(), 20);
        assert_eq!(batch.observations.len(), 20);
        assert_eq!(batch.report.missing_timestamps, 0);
        assert!(batch.observations.iter().all(|o| o.temperature != Some(1000.0)));
        assert_eq!(
            batch.report.timestamp_source,
            Some(TimestampSource::DateTime {
                date: "date".to_string(),
                time: "time".to_string()
            })
        );
    }

    #[test]
    fn test_empty_table_passes_vacuously() {
        let raw = CsvTableReader::new().parse_table("Temperature (c)\n").unwrap();

        let batch = EtlPipeline::new(1).clean_table(&raw);

        assert_eq!(batch.report.rows_before, 0);
        assert_eq!(batch.report.rows_removed, 0);
        assert!(batch.observations.is_empty());
    }

    #[test]
    fn test_run_loads_store_and_exports() -> Result<()> {
        let raw_dir = TempDir::new()?;
        let cleaned_dir = TempDir::new()?;
        write_csv(raw_dir.path(), "mission_a.csv", &spike_csv());
        write_csv(
            raw_dir.path(),
            "mission_b.csv",
            "timestamp,Temperature,Latitude\n2021-10-18T09:00:00Z,19.5,95.0\n",
        );

        let store = MemoryStore::new();
        let pipeline =
            EtlPipeline::new(2).with_cleaned_dir(Some(cleaned_dir.path().to_path_buf()));
        let summary = pipeline.run(raw_dir.path(), &store, None)?;

        assert_eq!(summary.files.len(), 2);
        assert_eq!(summary.total_before(), 22);
        assert_eq!(summary.total_removed(), 1);
        assert_eq!(summary.inserted, 21);
        assert_eq!(store.count(&Predicate::all())?, 21);
        // out-of-range coordinates are reported, not dropped
        assert_eq!(summary.files[1].coordinate_violations, 1);

        let exported = CsvTableReader::new().find_csv_files(cleaned_dir.path())?;
        assert_eq!(exported.len(), 2);
        let text = summary.generate_summary();
        assert!(text.contains("Rows removed as outliers: 1"));
        assert!(text.contains("Documents inserted: 21"));
        Ok(())
    }

    #[test]
    fn test_run_without_files_is_empty() -> Result<()> {
        let raw_dir = TempDir::new()?;
        let store = MemoryStore::new();

        let summary = EtlPipeline::new(1).run(raw_dir.path(), &store, None)?;

        assert!(summary.files.is_empty());
        assert_eq!(summary.inserted, 0);
        Ok(())
    }

    #[test]
    fn test_missing_raw_dir_is_an_error() {
        let store = MemoryStore::new();
        let result = EtlPipeline::new(1).run(Path::new("/no/such/raw/dir"), &store, None);
        assert!(matches!(result, Err(ProcessingError::Io(_))));
    }
}
