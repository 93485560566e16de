//! Reload a graph written by [`CsvGraphWriter`](crate::CsvGraphWriter).
//!
//! Structure goes through [`PersistableGraph`], so every structural check
//! of `SpatialGraph::from_persistable` applies.  Node and edge metadata is
//! restored on top.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use csv::{Reader, StringRecord};
use log::info;

use rg_core::NodeId;
use rg_spatial::{PersistableGraph, PersistedEdge, PersistedNode, RoadInfo, SpatialGraph};

use crate::csv::{EDGES_FILE, NODES_FILE};
use crate::row::{EdgeRow, NodeRow};
use crate::{OutputError, OutputResult};

pub fn load_graph_csv(dir: &Path) -> OutputResult<SpatialGraph> {
    let nodes = read_rows(&dir.join(NODES_FILE), NODES_FILE, node_row)?;
    let edges = read_rows(&dir.join(EDGES_FILE), EDGES_FILE, edge_row)?;

    let persisted = PersistableGraph {
        nodes: nodes
            .iter()
            .map(|r| PersistedNode { id: NodeId(r.id), lat: r.lat, lon: r.lon })
            .collect(),
        edges: edges
            .iter()
            .map(|r| PersistedEdge {
                source_id:  NodeId(r.source_id),
                target_id:  NodeId(r.target_id),
                distance_m: r.distance_m,
            })
            .collect(),
    };
    let mut graph = SpatialGraph::from_persistable(&persisted)?;

    for r in nodes {
        if let Some(n) = graph.node_mut(NodeId(r.id)) {
            n.merge_count = r.merge_count;
            n.road = RoadInfo { name: r.road_name, class: r.road_class, max_speed_kmh: r.max_speed_kmh };
            n.off_road = r.off_road;
            n.first_seen = r.first_seen;
            n.last_seen = r.last_seen;
            n.cell_id = r.cell_id;
        }
    }
    for r in edges {
        if let Some(e) = graph.edge_mut(NodeId(r.source_id), NodeId(r.target_id)) {
            e.road = RoadInfo { name: r.road_name, class: r.road_class, max_speed_kmh: r.max_speed_kmh };
        }
    }

    info!("loaded {} nodes and {} edges from {}", graph.node_count(), graph.edge_count(), dir.display());
    Ok(graph)
}

fn read_rows<T>(
    path: &Path,
    file: &'static str,
    parse: fn(&Fields<'_>) -> OutputResult<T>,
) -> OutputResult<Vec<T>> {
    let mut rdr = Reader::from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let line = rec.position().map_or(0, |p| p.line());
        out.push(parse(&Fields { rec: &rec, file, line })?);
    }
    Ok(out)
}

/// Typed access to one record, with errors that name the file and line.
struct Fields<'a> {
    rec:  &'a StringRecord,
    file: &'static str,
    line: u64,
}

impl Fields<'_> {
    fn err(&self, msg: String) -> OutputError {
        OutputError::Parse { file: self.file, line: self.line, msg }
    }

    fn opt<T>(&self, i: usize, name: &str) -> OutputResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.rec.get(i).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| self.err(format!("{name}: {e} ({raw:?})"))),
        }
    }

    fn req<T>(&self, i: usize, name: &str) -> OutputResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.opt(i, name)?.ok_or_else(|| self.err(format!("missing {name}")))
    }
}

fn node_row(f: &Fields<'_>) -> OutputResult<NodeRow> {
    let merge_count: u32 = f.req(3, "merge_count")?;
    if merge_count == 0 {
        return Err(f.err("merge_count must be at least 1".into()));
    }
    Ok(NodeRow {
        id: f.req(0, "id")?,
        lat: f.req(1, "lat")?,
        lon: f.req(2, "lon")?,
        merge_count,
        road_name: f.opt(4, "road_name")?,
        road_class: f.opt(5, "road_class")?,
        max_speed_kmh: f.opt(6, "max_speed_kmh")?,
        off_road: f.req::<u8>(7, "off_road")? != 0,
        first_seen: f.opt(8, "first_seen")?,
        last_seen: f.opt(9, "last_seen")?,
        cell_id: f.opt(10, "cell_id")?,
    })
}

fn edge_row(f: &Fields<'_>) -> OutputResult<EdgeRow> {
    Ok(EdgeRow {
        source_id: f.req(0, "source_id")?,
        target_id: f.req(1, "target_id")?,
        distance_m: f.req(2, "distance_m")?,
        road_name: f.opt(3, "road_name")?,
        road_class: f.opt(4, "road_class")?,
        max_speed_kmh: f.opt(5, "max_speed_kmh")?,
    })
}
