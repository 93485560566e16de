//! `rg-place` — facility placement on a built road graph.
//!
//! Placement runs later than, and independently of, graph construction:
//! it reads a finished [`SpatialGraph`](rg_spatial::SpatialGraph) and never
//! mutates it.
//!
//! # Crate layout
//!
//! | Module          | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | [`strategy`]    | `PlacementStrategy` trait, `PlacementParams`, `Placement` |
//! | [`kcenter`]     | `KCenter` (farthest-first, Dijkstra distances)         |
//! | [`kdominating`] | `KDominatingSet` (random greedy k-hop cover)           |
//! | [`csr`]         | `DenseGraph`, the CSR snapshot both strategies walk    |
//! | [`error`]       | `PlacementError`, `PlacementResult<T>`                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on params and results.     |

pub mod csr;
pub mod error;
pub mod kcenter;
pub mod kdominating;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use error::{PlacementError, PlacementResult};
pub use kcenter::KCenter;
pub use kdominating::KDominatingSet;
pub use strategy::{Placement, PlacementParams, PlacementStrategy};
