//! Pipeline error type.
//!
//! Only configuration problems are errors; everything that can go wrong with
//! the data itself is filtered, counted, and logged instead.

use thiserror::Error;

use rg_core::CoreError;
use rg_prep::PrepError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Prep(#[from] PrepError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
