//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `nodes.csv`
//! - `edges.csv`
//! - `placement.csv`
//!
//! Optional values are written as empty fields, booleans as `0` / `1`.

use std::fs::File;
use std::path::Path;

use csv::Writer;
use log::debug;

use rg_place::Placement;
use rg_spatial::SpatialGraph;

use crate::row::{EdgeRow, NodeRow, PlacementRow};
use crate::writer::GraphWriter;
use crate::OutputResult;

pub const NODES_FILE:     &str = "nodes.csv";
pub const EDGES_FILE:     &str = "edges.csv";
pub const PLACEMENT_FILE: &str = "placement.csv";

pub const NODE_HEADER: [&str; 11] = [
    "id", "lat", "lon", "merge_count", "road_name", "road_class", "max_speed_kmh",
    "off_road", "first_seen", "last_seen", "cell_id",
];
pub const EDGE_HEADER: [&str; 6] =
    ["source_id", "target_id", "distance_m", "road_name", "road_class", "max_speed_kmh"];
pub const PLACEMENT_HEADER: [&str; 6] = ["strategy", "rank", "node_id", "lat", "lon", "objective"];

/// Writes a graph and its placements to three CSV files.
pub struct CsvGraphWriter {
    nodes:     Writer<File>,
    edges:     Writer<File>,
    placement: Writer<File>,
    finished:  bool,
}

impl CsvGraphWriter {
    /// Open (or create) the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut nodes = Writer::from_path(dir.join(NODES_FILE))?;
        nodes.write_record(NODE_HEADER)?;

        let mut edges = Writer::from_path(dir.join(EDGES_FILE))?;
        edges.write_record(EDGE_HEADER)?;

        let mut placement = Writer::from_path(dir.join(PLACEMENT_FILE))?;
        placement.write_record(PLACEMENT_HEADER)?;

        Ok(Self { nodes, edges, placement, finished: false })
    }
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(T::to_string).unwrap_or_default()
}

impl GraphWriter for CsvGraphWriter {
    fn write_graph(&mut self, graph: &SpatialGraph) -> OutputResult<()> {
        for row in graph.nodes().map(NodeRow::from) {
            self.nodes.write_record(&[
                row.id.to_string(),
                row.lat.to_string(),
                row.lon.to_string(),
                row.merge_count.to_string(),
                opt(&row.road_name),
                opt(&row.road_class),
                opt(&row.max_speed_kmh),
                (row.off_road as u8).to_string(),
                opt(&row.first_seen),
                opt(&row.last_seen),
                opt(&row.cell_id),
            ])?;
        }
        for row in graph.edges().map(EdgeRow::from) {
            self.edges.write_record(&[
                row.source_id.to_string(),
                row.target_id.to_string(),
                row.distance_m.to_string(),
                opt(&row.road_name),
                opt(&row.road_class),
                opt(&row.max_speed_kmh),
            ])?;
        }
        debug!("wrote {} nodes and {} edges", graph.node_count(), graph.edge_count());
        Ok(())
    }

    fn write_placement(
        &mut self,
        strategy: &'static str,
        placement: &Placement,
        graph: &SpatialGraph,
    ) -> OutputResult<()> {
        for row in PlacementRow::from_placement(strategy, placement, graph) {
            self.placement.write_record(&[
                row.strategy.to_owned(),
                row.rank.to_string(),
                row.node_id.to_string(),
                row.lat.to_string(),
                row.lon.to_string(),
                row.objective.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.nodes.flush()?;
        self.edges.flush()?;
        self.placement.flush()?;
        Ok(())
    }
}
