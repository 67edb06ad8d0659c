pub mod column_normalizer;
pub mod etl_pipeline;
pub mod outlier_detector;

pub use column_normalizer::{observations_from_table, ColumnNormalizer, TimestampSource};
pub use etl_pipeline::{CleanedBatch, EtlPipeline, EtlSummary, FileReport};
pub use outlier_detector::{
    CleanMask, CleanPolicy, OutlierDetector, OutlierMethod, OutlierOutcome, OutlierQuery,
};
