pub mod field;
pub mod observation;
pub mod raw;

pub use field::NumericField;
pub use observation::Observation;
pub use raw::{RawTable, RawValue};
