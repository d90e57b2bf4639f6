//! Error handling for the PMI synthesizer.

pub mod util;

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Process exit code for a usage error (bad paths or arguments)
pub const EXIT_USAGE: i32 = 64;
/// Process exit code for malformed input or a serialization failure
pub const EXIT_DATA: i32 = 65;
/// Process exit code for an I/O failure
pub const EXIT_IO: i32 = 74;
/// Process exit code for a configuration error
pub const EXIT_CONFIG: i32 = 78;

/// Errors raised while loading reference data or synthesizing a PMI
#[derive(Debug, thiserror::Error)]
pub enum PmiError {
    /// Malformed, missing or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source table lacks a column the generator requires
    #[error("Configuration error: column '{column}' missing from {source_name}")]
    MissingColumn {
        /// Name of the missing column
        column: String,
        /// File or table that was expected to carry it
        source_name: String,
    },

    /// A bounded retry loop ran out of attempts
    #[error("Data exhaustion: no unique {what} found after {attempts} attempts")]
    DataExhaustion {
        /// What was being searched for
        what: String,
        /// Attempts made before giving up
        attempts: usize,
    },

    /// A generated value does not fit the downstream size limit
    #[error(
        "Serialization error: record UR {ur} column '{column}' is {length} characters (limit {limit})"
    )]
    Serialization {
        /// UR of the offending record
        ur: String,
        /// Column holding the oversized value
        column: String,
        /// Length of the value
        length: usize,
        /// Configured limit
        limit: usize,
    },

    /// Invalid command-line usage, such as a path that does not exist
    #[error("Usage error: {0}")]
    Usage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error converting between Arrow batches and typed rows
    #[error("Arrow conversion error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),
}

impl PmiError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Shorthand for a missing-column error
    pub fn missing_column(column: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            source_name: source_name.into(),
        }
    }

    /// Shorthand for an exhausted retry budget
    pub fn exhausted(what: impl Into<String>, attempts: usize) -> Self {
        Self::DataExhaustion {
            what: what.into(),
            attempts,
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Serialization { .. } | Self::Json(_) | Self::SerdeArrow(_) | Self::Arrow(_) => {
                EXIT_DATA
            }
            Self::Io(_) | Self::Parquet(_) => EXIT_IO,
            Self::Config(_) | Self::MissingColumn { .. } | Self::DataExhaustion { .. } => {
                EXIT_CONFIG
            }
        }
    }
}

/// Result type for PMI synthesizer operations
pub type Result<T> = std::result::Result<T, PmiError>;
