//! `rg-build` — road-graph construction and the end-to-end pipeline.
//!
//! # Crate layout
//!
//! | Module          | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | [`triangulate`] | Delaunay edges over a local planar projection          |
//! | [`builder`]     | `GraphBuilder` (cold / warm), Gabriel test, stats      |
//! | [`matcher`]     | `RoadMatcher` trait, `SnappedPoint`, `NoopMatcher`     |
//! | [`mapmatch`]    | `MapMatchAdapter` (snap, merge, enrich, prune)         |
//! | [`pipeline`]    | `PipelineBuilder`, `Pipeline`, `PipelineReport`        |
//! | [`error`]       | `PipelineError`, `PipelineResult<T>`                   |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Forwards to `rg-prep/parallel`.                           |
//! | `serde`    | Forwards serde derives to the lower crates.               |

pub mod builder;
pub mod error;
pub mod mapmatch;
pub mod matcher;
pub mod pipeline;
pub mod triangulate;

#[cfg(test)]
mod tests;

pub use builder::{BuildPath, BuildStats, GraphBuilder};
pub use error::{PipelineError, PipelineResult};
pub use mapmatch::{MapMatchAdapter, MatchStats};
pub use matcher::{NoopMatcher, RoadMatcher, SnappedPoint};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineReport};
