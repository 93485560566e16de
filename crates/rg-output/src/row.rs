//! Plain data row types written by output backends.

use rg_core::NodeId;
use rg_place::Placement;
use rg_spatial::{Edge, Node, RoadClass, SpatialGraph};

/// One graph node with everything the pipeline learned about it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    pub id:            u64,
    pub lat:           f64,
    pub lon:           f64,
    pub merge_count:   u32,
    pub road_name:     Option<String>,
    pub road_class:    Option<RoadClass>,
    pub max_speed_kmh: Option<f64>,
    pub off_road:      bool,
    pub first_seen:    Option<i64>,
    pub last_seen:     Option<i64>,
    /// Coarse hex cell, as a raw H3 index.
    pub cell_id:       Option<u64>,
}

impl From<&Node> for NodeRow {
    fn from(n: &Node) -> Self {
        Self {
            id:            n.id().get(),
            lat:           n.pos().lat,
            lon:           n.pos().lon,
            merge_count:   n.merge_count,
            road_name:     n.road.name.clone(),
            road_class:    n.road.class,
            max_speed_kmh: n.road.max_speed_kmh,
            off_road:      n.off_road,
            first_seen:    n.first_seen,
            last_seen:     n.last_seen,
            cell_id:       n.cell_id,
        }
    }
}

/// One undirected edge; `source_id < target_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRow {
    pub source_id:     u64,
    pub target_id:     u64,
    pub distance_m:    f64,
    pub road_name:     Option<String>,
    pub road_class:    Option<RoadClass>,
    pub max_speed_kmh: Option<f64>,
}

impl From<&Edge> for EdgeRow {
    fn from(e: &Edge) -> Self {
        Self {
            source_id:     e.source().get(),
            target_id:     e.target().get(),
            distance_m:    e.distance_m(),
            road_name:     e.road.name.clone(),
            road_class:    e.road.class,
            max_speed_kmh: e.road.max_speed_kmh,
        }
    }
}

/// One selected facility.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRow {
    pub strategy:  &'static str,
    /// Position in selection order, from 0.
    pub rank:      usize,
    pub node_id:   u64,
    pub lat:       f64,
    pub lon:       f64,
    /// The placement's overall objective, repeated on every row.
    pub objective: f64,
}

impl PlacementRow {
    /// Rows for every selected node still present in `graph`.
    pub fn from_placement(strategy: &'static str, placement: &Placement, graph: &SpatialGraph) -> Vec<Self> {
        placement
            .selected
            .iter()
            .enumerate()
            .filter_map(|(rank, &id): (usize, &NodeId)| {
                let pos = graph.node(id)?.pos();
                Some(Self {
                    strategy,
                    rank,
                    node_id: id.get(),
                    lat: pos.lat,
                    lon: pos.lon,
                    objective: placement.objective,
                })
            })
            .collect()
    }
}
