//! Placement error type.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    /// Asking for zero facilities is a caller bug, not an empty answer.
    #[error("placement needs k >= 1")]
    ZeroK,
}

pub type PlacementResult<T> = Result<T, PlacementError>;
