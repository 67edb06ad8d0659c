pub mod constants;
pub mod filename;
pub mod parsing;
pub mod progress;

pub use constants::*;
pub use filename::generate_cleaned_filename;
pub use parsing::{parse_finite, parse_timestamp};
pub use progress::ProgressReporter;
