//! Error types for the unbiased-core crate.

use thiserror::Error;

/// Top-level error type for dataset loading and bias analysis.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Dataset has no rows")]
    EmptyDataset,

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AuditError {
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound(name.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
