//! `rg-core` — foundational types for the `rust_roadgraph` workspace.
//!
//! This crate is a dependency of every other `rg-*` crate.  It intentionally
//! has no `rg-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `TripId`, `RoadSegmentId`                   |
//! | [`geo`]         | `GeoPoint`, `BoundingBox`, haversine, bearings        |
//! | [`config`]      | `PipelineConfig` and its validation                   |
//! | [`rng`]         | `SeedRng` (injected randomness)                       |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `rg-spatial/serde`.                            |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::PipelineConfig;
pub use error::{CoreError, CoreResult};
pub use geo::{BoundingBox, GeoPoint, angular_difference};
pub use ids::{NodeId, RoadSegmentId, TripId};
pub use rng::SeedRng;
