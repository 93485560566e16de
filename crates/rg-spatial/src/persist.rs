//! Flat, storage-friendly form of a [`SpatialGraph`].
//!
//! Only positions, IDs and edge weights survive the round trip; merge counts
//! and road metadata are rebuilt by the next pipeline run.  Persisted edge
//! weights are trusted as-is on load.

use rg_core::{GeoPoint, NodeId};

use crate::{Node, SpatialError, SpatialGraph, SpatialResult};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistedNode {
    pub id:  NodeId,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistedEdge {
    pub source_id:  NodeId,
    pub target_id:  NodeId,
    pub distance_m: f64,
}

/// A graph as plain node and edge lists, in ID order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistableGraph {
    pub nodes: Vec<PersistedNode>,
    pub edges: Vec<PersistedEdge>,
}

impl SpatialGraph {
    /// Snapshot the graph.  Each undirected edge is emitted once with the
    /// smaller ID as `source_id`.
    pub fn to_persistable(&self) -> PersistableGraph {
        let nodes = self
            .nodes()
            .map(|n| PersistedNode { id: n.id(), lat: n.pos().lat, lon: n.pos().lon })
            .collect();
        let edges = self
            .edges()
            .map(|e| PersistedEdge {
                source_id:  e.source(),
                target_id:  e.target(),
                distance_m: e.distance_m(),
            })
            .collect();
        PersistableGraph { nodes, edges }
    }

    /// Rebuild a graph (index included) from its persisted form.
    ///
    /// Fails on duplicate node IDs, non-finite or out-of-range coordinates,
    /// edges to unknown nodes, self-loops, duplicate edges and negative or
    /// non-finite weights.  Node IDs are preserved, and fresh IDs allocated
    /// afterwards continue past the largest one loaded.
    pub fn from_persistable(data: &PersistableGraph) -> SpatialResult<Self> {
        let mut g = SpatialGraph::new();

        for pn in &data.nodes {
            let pos = GeoPoint::new(pn.lat, pn.lon);
            if !pn.lat.is_finite() || !pn.lon.is_finite() || !pos.in_valid_range() {
                return Err(SpatialError::Malformed(format!("{} has invalid position {pos}", pn.id)));
            }
            if pn.id == NodeId::INVALID {
                return Err(SpatialError::Malformed("node with the invalid sentinel ID".into()));
            }
            if !g.add_node(Node::new(pn.id, pos)) {
                return Err(SpatialError::Malformed(format!("duplicate {}", pn.id)));
            }
        }

        for pe in &data.edges {
            for id in [pe.source_id, pe.target_id] {
                if !g.contains(id) {
                    return Err(SpatialError::UnknownEndpoint(id));
                }
            }
            if pe.source_id == pe.target_id {
                return Err(SpatialError::Malformed(format!("self-loop on {}", pe.source_id)));
            }
            if !pe.distance_m.is_finite() || pe.distance_m < 0.0 {
                return Err(SpatialError::Malformed(format!(
                    "edge {}–{} has weight {}",
                    pe.source_id, pe.target_id, pe.distance_m
                )));
            }
            if !g.add_edge(pe.source_id, pe.target_id, pe.distance_m) {
                return Err(SpatialError::Malformed(format!(
                    "duplicate edge {}–{}",
                    pe.source_id, pe.target_id
                )));
            }
        }

        Ok(g)
    }
}
