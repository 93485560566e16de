//! Read-only dense snapshot of a [`SpatialGraph`] for placement.
//!
//! # Data layout
//!
//! Nodes are renumbered `0..n` in ascending `NodeId` order, so "lowest
//! index" and "lowest id" break ties identically.  Adjacency uses
//! **Compressed Sparse Row** format: the neighbours of dense node `i` are
//!
//! ```text
//! adj_to[ adj_start[i] .. adj_start[i+1] ]
//! ```
//!
//! with the matching edge weights at the same positions of `adj_weight_m`.
//! Each undirected edge appears once in each direction.

use rustc_hash::FxHashMap;

use rg_core::NodeId;
use rg_spatial::SpatialGraph;

pub struct DenseGraph {
    /// Dense index → graph id.  Sorted ascending.
    pub ids:          Vec<NodeId>,
    /// CSR row pointer, length `node_count + 1`.
    pub adj_start:    Vec<u32>,
    pub adj_to:       Vec<u32>,
    pub adj_weight_m: Vec<f64>,
}

impl DenseGraph {
    /// Snapshot `graph`.  O(E log E) for the arc sort.
    pub fn from_graph(graph: &SpatialGraph) -> Self {
        let ids: Vec<NodeId> = graph.node_ids().collect();
        let index: FxHashMap<NodeId, u32> =
            ids.iter().enumerate().map(|(i, &id)| (id, i as u32)).collect();
        let n = ids.len();

        // Both directions of every edge.
        let mut arcs: Vec<(u32, u32, f64)> = Vec::with_capacity(graph.edge_count() * 2);
        for e in graph.edges() {
            let (Some(&a), Some(&b)) = (index.get(&e.source()), index.get(&e.target())) else {
                continue;
            };
            arcs.push((a, b, e.distance_m()));
            arcs.push((b, a, e.distance_m()));
        }
        arcs.sort_unstable_by_key(|&(from, to, _)| (from, to));

        let mut adj_start = vec![0u32; n + 1];
        for &(from, _, _) in &arcs {
            adj_start[from as usize + 1] += 1;
        }
        for i in 1..=n {
            adj_start[i] += adj_start[i - 1];
        }
        debug_assert_eq!(adj_start[n] as usize, arcs.len());

        Self {
            ids,
            adj_start,
            adj_to: arcs.iter().map(|a| a.1).collect(),
            adj_weight_m: arcs.iter().map(|a| a.2).collect(),
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn degree(&self, i: usize) -> usize {
        (self.adj_start[i + 1] - self.adj_start[i]) as usize
    }

    /// `(neighbour, weight)` pairs of dense node `i`.
    #[inline]
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.adj_start[i] as usize..self.adj_start[i + 1] as usize;
        self.adj_to[range.clone()]
            .iter()
            .zip(&self.adj_weight_m[range])
            .map(|(&to, &w)| (to as usize, w))
    }
}
