pub mod summary_stats;

pub use summary_stats::{FieldSummary, Summary, SummaryStatistics};
