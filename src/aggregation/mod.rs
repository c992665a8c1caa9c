//! Time-bucketed record counts across the catalog exports.
//!
//! Each export is counted per creation year (all time) and per creation
//! month (trailing twelve months), once with every row and once without the
//! rows matched by its geo filter. The per-export counts are then inner-joined
//! on the bucket, so a bucket shows up only when every export has it.

pub mod bucket;
pub mod counts;
pub mod tables;
pub mod types;

pub use bucket::{Bucket, Granularity, Window, window_start};
pub use tables::{aggregate_all, aggregate_table};
pub use types::{AggregateRow, AggregateTable, Aggregates, View};
