//! Graph construction from cleaned, thinned points.
//!
//! | Graph state | Path | Edges from                                         |
//! |-------------|------|----------------------------------------------------|
//! | empty       | cold | Delaunay, then Gabriel and length pruning          |
//! | non-empty   | warm | merge into a close node, or kNN + local Gabriel    |
//!
//! A cold start with fewer than two points leaves the graph untouched.
//! Both paths leave the graph consistent: every edge weight equals the
//! current distance between its endpoints when `build` returns.

use h3o::Resolution;
use log::{debug, info};
use rustc_hash::FxHashSet;

use rg_core::{GeoPoint, NodeId, PipelineConfig};
use rg_prep::PositionRecord;
use rg_prep::hexgrid::{cell_id, resolution};
use rg_spatial::SpatialGraph;

use crate::PipelineResult;
use crate::triangulate::delaunay_edges;

/// Points this close to the Gabriel circle count as inside it.
pub const GABRIEL_TOLERANCE_M: f64 = 0.01;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuildPath {
    Cold,
    Warm,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildStats {
    pub path:           BuildPath,
    pub nodes_added:    usize,
    pub points_merged:  usize,
    pub edges_added:    usize,
    pub gabriel_pruned: usize,
    pub length_pruned:  usize,
}

impl BuildStats {
    fn new(path: BuildPath) -> Self {
        Self {
            path,
            nodes_added:    0,
            points_merged:  0,
            edges_added:    0,
            gabriel_pruned: 0,
            length_pruned:  0,
        }
    }
}

pub struct GraphBuilder<'a> {
    config:      &'a PipelineConfig,
    cluster_res: Resolution,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a PipelineConfig) -> PipelineResult<Self> {
        Ok(Self { config, cluster_res: resolution(config.hex_cluster_resolution)? })
    }

    /// Insert `points` into `graph`, choosing the path by whether the graph
    /// is empty.
    pub fn build(&self, graph: &mut SpatialGraph, points: &[PositionRecord]) -> BuildStats {
        let stats = if graph.is_empty() {
            self.cold(graph, points)
        } else {
            self.warm(graph, points)
        };
        info!(
            "{:?} build: +{} nodes, {} merged, +{} edges ({} gabriel / {} length pruned)",
            stats.path,
            stats.nodes_added,
            stats.points_merged,
            stats.edges_added,
            stats.gabriel_pruned,
            stats.length_pruned
        );
        stats
    }

    fn add_point(&self, graph: &mut SpatialGraph, p: &PositionRecord) -> NodeId {
        let id = graph.create_node(p.pos);
        if let Some(node) = graph.node_mut(id) {
            node.cell_id = cell_id(p.pos, self.cluster_res);
            if let Some(ts) = p.timestamp {
                node.observe(ts);
            }
        }
        id
    }

    // ── Cold start ────────────────────────────────────────────────────────

    fn cold(&self, graph: &mut SpatialGraph, points: &[PositionRecord]) -> BuildStats {
        let mut stats = BuildStats::new(BuildPath::Cold);
        if points.len() < 2 {
            debug!("cold start needs at least 2 points, got {}", points.len());
            return stats;
        }

        let ids: Vec<NodeId> = points.iter().map(|p| self.add_point(graph, p)).collect();
        stats.nodes_added = ids.len();

        let positions: Vec<GeoPoint> = points.iter().map(|p| p.pos).collect();
        for (i, j) in delaunay_edges(&positions) {
            graph.add_edge_measured(ids[i], ids[j]);
        }
        debug!("triangulation produced {} edges", graph.edge_count());

        // Gabriel status depends only on node positions, so the order of
        // removals does not matter.
        let candidates: Vec<(NodeId, NodeId)> =
            graph.edges().map(|e| (e.source(), e.target())).collect();
        for (a, b) in candidates {
            if violates_gabriel(graph, a, b) {
                graph.remove_edge(a, b);
                stats.gabriel_pruned += 1;
            }
        }

        let max_len = self.config.max_edge_length_m;
        let too_long: Vec<(NodeId, NodeId)> = graph
            .edges()
            .filter(|e| e.distance_m() > max_len)
            .map(|e| (e.source(), e.target()))
            .collect();
        for (a, b) in too_long {
            graph.remove_edge(a, b);
            stats.length_pruned += 1;
        }

        stats.edges_added = graph.edge_count();
        stats
    }

    // ── Warm / incremental ────────────────────────────────────────────────

    fn warm(&self, graph: &mut SpatialGraph, points: &[PositionRecord]) -> BuildStats {
        let mut stats = BuildStats::new(BuildPath::Warm);
        let mut moved: FxHashSet<NodeId> = FxHashSet::default();

        for p in points {
            if let Some((target, _)) = graph.nearest(p.pos, self.config.merge_threshold_m) {
                graph.absorb_point(target, p.pos, p.timestamp);
                moved.insert(target);
                stats.points_merged += 1;
                continue;
            }

            let id = self.add_point(graph, p);
            stats.nodes_added += 1;

            // The new node is its own nearest hit.
            let neighbours: Vec<NodeId> = graph
                .k_nearest(p.pos, self.config.knn_k + 1, self.config.max_edge_length_m)
                .into_iter()
                .map(|(nb, _)| nb)
                .filter(|&nb| nb != id)
                .take(self.config.knn_k)
                .collect();

            for nb in neighbours {
                if !graph.add_edge_measured(id, nb) {
                    continue;
                }
                if violates_gabriel(graph, id, nb) {
                    graph.remove_edge(id, nb);
                    stats.gabriel_pruned += 1;
                } else {
                    stats.edges_added += 1;
                }
            }
        }

        graph.refresh_edges_of(moved);
        stats
    }
}

/// `true` if some third node lies inside (or within tolerance of) the
/// circle with `a`–`b` as diameter.
pub fn violates_gabriel(graph: &SpatialGraph, a: NodeId, b: NodeId) -> bool {
    let (Some(na), Some(nb)) = (graph.node(a), graph.node(b)) else {
        return false;
    };
    let mid = na.pos().midpoint(nb.pos());
    let radius = na.pos().distance_m(nb.pos()) * 0.5;
    !graph.in_radius(mid, radius + GABRIEL_TOLERANCE_M, &[a, b]).is_empty()
}
