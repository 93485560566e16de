//! Spatial-subsystem error type.

use thiserror::Error;

use rg_core::NodeId;

/// Errors produced by `rg-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// A persisted graph could not be reconstructed.
    #[error("malformed persisted graph: {0}")]
    Malformed(String),

    #[error("persisted edge references unknown node {0}")]
    UnknownEndpoint(NodeId),

    /// Index, node map and adjacency disagree.  Always a bug.
    #[error("graph invariant violated: {0}")]
    Invariant(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
