use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use water_quality_processor::analyzers::SummaryStatistics;
use water_quality_processor::models::{NumericField, Observation, RawTable, RawValue};
use water_quality_processor::processors::{CleanPolicy, ColumnNormalizer, OutlierDetector};
use water_quality_processor::query::{Pagination, RangeFilter};
use water_quality_processor::store::{MemoryStore, RecordStore};

// Synthetic survey: smooth drift with an occasional spike
fn create_observations(count: usize) -> Vec<Observation> {
    let start = Utc.with_ymd_and_hms(2021, 10, 17, 0, 0, 0).unwrap();

    (0..count)
        .map(|i| {
            let spike = if i % 97 == 0 { 40.0 } else { 0.0 };
            Observation::new(Some(start + Duration::seconds(i as i64)))
                .with_value(NumericField::Temperature, 20.0 + (i % 50) as f64 * 0.05 + spike)
                .with_value(NumericField::Salinity, 35.0 + (i % 7) as f64 * 0.1)
                .with_value(NumericField::Odo, 6.0 + (i % 11) as f64 * 0.02)
                .with_value(NumericField::Latitude, 25.7)
                .with_value(NumericField::Longitude, -80.1)
        })
        .collect()
}

fn create_raw_table(rows: usize) -> RawTable {
    let mut table = RawTable::new(
        ["Date", "Time", "Temperature (c)", "Salinity (ppt)", "ODO mg/L", "Latitude", "Longitude"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
    );
    for i in 0..rows {
        table.push_row(vec![
            RawValue::from("10/17/2021"),
            RawValue::from(format!("{:02}:{:02}:{:02}", (i / 3600) % 24, (i / 60) % 60, i % 60)),
            RawValue::from(format!("{:.2}", 20.0 + (i % 50) as f64 * 0.05)),
            RawValue::from("35.1"),
            RawValue::from("6.2"),
            RawValue::from("25.7"),
            RawValue::from("-80.1"),
        ]);
    }
    table
}

fn benchmark_outlier_detection(c: &mut Criterion) {
    let observations = create_observations(10_000);

    c.bench_function("iqr_flag_temperature", |b| {
        let detector = OutlierDetector::iqr(1.5);
        b.iter(|| {
            let flags = detector.flag_field(black_box(&observations), NumericField::Temperature);
            black_box(flags.iter().filter(|f| **f).count())
        })
    });

    c.bench_function("zscore_clean_policy", |b| {
        let policy = CleanPolicy::new();
        b.iter(|| black_box(policy.mask(black_box(&observations)).removed()))
    });
}

fn benchmark_summary_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary_by_size");

    for &size in &[1_000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("observations", size), &size, |b, &count| {
            let observations = create_observations(count);
            let stats = SummaryStatistics::new();
            b.iter(|| black_box(stats.summarize(black_box(&observations))))
        });
    }

    group.finish();
}

fn benchmark_normalization(c: &mut Criterion) {
    let table = create_raw_table(5_000);

    c.bench_function("normalize_raw_table", |b| {
        let normalizer = ColumnNormalizer::new();
        b.iter(|| black_box(normalizer.to_observations(black_box(&table)).len()))
    });
}

fn benchmark_store_queries(c: &mut Criterion) {
    let store = MemoryStore::new();
    store.insert_many(create_observations(50_000)).unwrap();
    let start = Utc.with_ymd_and_hms(2021, 10, 17, 6, 0, 0).unwrap();
    let filter = RangeFilter::new()
        .with_time_window(Some(start), Some(start + Duration::hours(1)))
        .with_range(NumericField::Temperature, Some(20.0), Some(21.0));
    let predicate = filter.to_predicate();

    let mut group = c.benchmark_group("time_window_query");
    group.bench_function("scan", |b| {
        b.iter(|| black_box(store.find(&predicate, Pagination::default()).unwrap().len()))
    });

    store
        .create_index(water_quality_processor::store::IndexField::Timestamp)
        .unwrap();
    group.bench_function("indexed", |b| {
        b.iter(|| black_box(store.find(&predicate, Pagination::default()).unwrap().len()))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_outlier_detection,
    benchmark_summary_statistics,
    benchmark_normalization,
    benchmark_store_queries
);
criterion_main!(benches);
