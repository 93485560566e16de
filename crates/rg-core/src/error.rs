//! Workspace base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, keeping error sites clean.

use thiserror::Error;

/// The top-level error type for `rg-core` and a common base for sub-crates.
///
/// Input-data anomalies are never errors: they are filtered and counted.
/// Errors are reserved for configuration and contract violations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `rg-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
