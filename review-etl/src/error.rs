//! Error types for review-etl
//!
//! Stage-level failures only. A raw record that cannot be normalized is not
//! an error: it is reported as a [`crate::normalize::Rejection`] and skipped.

use thiserror::Error;

/// Main error type for the pipeline stages
#[derive(Error, Debug)]
pub enum Error {
    /// Record Store failure (connectivity, query, encoding)
    #[error("Store error: {0}")]
    Store(#[from] review_common::Error),

    /// CSV input could not be parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet input could not be opened or read
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Input parsed but its shape is unusable (e.g. row wider than header)
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for Error {
    fn from(e: calamine::Error) -> Self {
        Error::Spreadsheet(e.to_string())
    }
}

/// Convenience Result type using review-etl Error
pub type Result<T> = std::result::Result<T, Error>;
