//! `rg-output` — export and re-import of built road graphs.
//!
//! | File            | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | `nodes.csv`     | one row per node, with road metadata and seen-range    |
//! | `edges.csv`     | one row per undirected edge, `source_id < target_id`   |
//! | `placement.csv` | selected facilities, one row per node per strategy     |
//!
//! Writers implement [`GraphWriter`].  [`load_graph_csv`] reads `nodes.csv`
//! and `edges.csv` back into a `SpatialGraph`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rg_output::{CsvGraphWriter, GraphWriter, load_graph_csv};
//!
//! let mut writer = CsvGraphWriter::new(Path::new("./output"))?;
//! writer.write_graph(&graph)?;
//! writer.write_placement("k-center", &placement, &graph)?;
//! writer.finish()?;
//!
//! let reloaded = load_graph_csv(Path::new("./output"))?;
//! ```

pub mod csv;
pub mod error;
pub mod load;
pub mod row;
pub mod writer;


pub use csv::CsvGraphWriter;
pub use error::{OutputError, OutputResult};
pub use load::load_graph_csv;
pub use row::{EdgeRow, NodeRow, PlacementRow};
pub use writer::GraphWriter;
