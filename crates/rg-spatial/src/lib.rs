//! `rg-spatial` — the mutable road graph and its spatial index.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`graph`]   | `SpatialGraph` (node arena + adjacency + R-tree)            |
//! | [`node`]    | `Node`, `Edge`, `EdgeKey`                                   |
//! | [`road`]    | `RoadInfo`, `RoadClass`                                     |
//! | [`persist`] | `PersistableGraph` load/store form                          |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on the persisted form and  |
//! |         | road metadata.                                               |

pub mod error;
pub mod graph;
pub mod node;
pub mod persist;
pub mod road;


pub use error::{SpatialError, SpatialResult};
pub use graph::SpatialGraph;
pub use node::{Edge, EdgeKey, Node};
pub use persist::{PersistableGraph, PersistedEdge, PersistedNode};
pub use road::{RoadClass, RoadInfo};
