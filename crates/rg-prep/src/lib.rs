//! `rg-prep` — turning raw GPS fixes into construction-ready points.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`record`]     | `PositionRecord`                                         |
//! | [`preprocess`] | `Preprocessor` (seven-stage filter chain), stats         |
//! | [`trips`]      | `segment_trips`, `Trip`                                  |
//! | [`hexgrid`]    | `HexGridDeduplicator`, H3 cell helpers                   |
//! | [`error`]      | `PrepError`, `PrepResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Density-outlier counts run on the rayon thread pool.      |
//! | `serde`    | Derives `Serialize`/`Deserialize` on `PositionRecord`.    |

pub mod error;
pub mod hexgrid;
pub mod preprocess;
pub mod record;
pub mod trips;


pub use error::{PrepError, PrepResult};
pub use hexgrid::HexGridDeduplicator;
pub use preprocess::{PreprocessStats, Preprocessor};
pub use record::PositionRecord;
pub use trips::{Segmented, Trip, segment_trips};
