pub mod predicate;
pub mod range_filter;

pub use predicate::{Clause, Predicate};
pub use range_filter::{FieldRange, Pagination, RangeFilter};
