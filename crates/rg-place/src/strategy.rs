//! The contract shared by every placement algorithm.

use std::collections::BTreeMap;

use rg_core::NodeId;
use rg_spatial::SpatialGraph;

use crate::PlacementResult;

/// Input common to all strategies.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementParams {
    /// Number of facilities (k-center) or hop bound (k-dominating set).
    pub k:            usize,
    /// Stop adding centers once every node is within this distance.
    /// Strategies without a metric objective ignore it.
    pub max_radius_m: Option<f64>,
}

impl PlacementParams {
    pub fn new(k: usize) -> Self {
        Self { k, max_radius_m: None }
    }

    pub fn with_max_radius(mut self, radius_m: f64) -> Self {
        self.max_radius_m = Some(radius_m);
        self
    }
}

/// The outcome of one placement call.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    /// Chosen nodes in selection order.
    pub selected:  Vec<NodeId>,
    /// Strategy-specific score: covering radius in metres for k-center,
    /// number of selected nodes for the dominating set.
    pub objective: f64,
    /// Distance from every node to its closest selected node, in the
    /// strategy's unit.
    pub per_node:  BTreeMap<NodeId, f64>,
}

impl Placement {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// A facility-placement algorithm over a built road graph.
///
/// Implementations only read the graph.  `&mut self` lets randomised
/// strategies advance their injected RNG.
pub trait PlacementStrategy {
    /// Short stable name, used in logs and exported files.
    fn name(&self) -> &'static str;

    /// Errors only on contract violations (`k == 0`).  An empty graph
    /// yields an empty placement with objective 0.
    fn place(&mut self, graph: &SpatialGraph, params: &PlacementParams) -> PlacementResult<Placement>;
}
