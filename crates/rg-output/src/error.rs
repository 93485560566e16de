//! Error types for rg-output.

use thiserror::Error;

use rg_spatial::SpatialError;

/// Errors that can occur when writing or reloading a graph.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The files parsed but do not describe a valid graph.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error("{file} line {line}: {msg}")]
    Parse { file: &'static str, line: u64, msg: String },
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
