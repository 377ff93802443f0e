// src/error.rs
//
// Crate-wide error type. Query-time non-matches are never errors; these
// variants cover contract violations and record-source failures.

use thiserror::Error;

/// Result type alias for suggestion and index operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The column is not tracked by the index (or absent from a partition).
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Unknown partition '{0}'")]
    UnknownPartition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed partition file.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
