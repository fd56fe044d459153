//! Dataset model, ingestion, typing, and column-eligibility heuristics.

pub mod columns;
pub mod dataset;
pub mod loader;
pub mod schema;

pub use columns::{ColumnAnalysis, ExcludedColumn, ExclusionReason};
pub use dataset::{Dataset, display_value};
pub use loader::load_dataset;
pub use schema::{ColumnProfile, ColumnType};
