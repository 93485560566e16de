//! Farthest-first k-center (Gonzalez), a 2-approximation of the optimal
//! covering radius.
//!
//! Distances are shortest paths over edge weights.  The first center is the
//! node of maximum degree; every further center is the node currently
//! farthest from all chosen ones.  Nodes no center can reach are at `+∞`,
//! so each disconnected component receives a center before any reachable
//! node gets a second one.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use log::debug;

use rg_spatial::SpatialGraph;

use crate::csr::DenseGraph;
use crate::{Placement, PlacementError, PlacementParams, PlacementResult, PlacementStrategy};

#[derive(Copy, Clone, Debug, Default)]
pub struct KCenter;

impl PlacementStrategy for KCenter {
    fn name(&self) -> &'static str {
        "k-center"
    }

    fn place(&mut self, graph: &SpatialGraph, params: &PlacementParams) -> PlacementResult<Placement> {
        if params.k == 0 {
            return Err(PlacementError::ZeroK);
        }
        let dense = DenseGraph::from_graph(graph);
        let n = dense.node_count();
        if n == 0 {
            return Ok(Placement::default());
        }
        if params.k >= n {
            return Ok(Placement {
                selected:  dense.ids.clone(),
                objective: 0.0,
                per_node:  dense.ids.iter().map(|&id| (id, 0.0)).collect(),
            });
        }

        // Max degree, ties to the lowest id.
        let first = (0..n)
            .max_by_key(|&i| (dense.degree(i), Reverse(i)))
            .unwrap_or(0);

        let mut dist = vec![f64::INFINITY; n];
        let mut is_center = vec![false; n];
        let mut centers = vec![first];
        is_center[first] = true;
        relax_from(&dense, first, &mut dist);

        while centers.len() < params.k {
            let Some(next) = farthest(&dist, &is_center) else {
                break;
            };
            if params.max_radius_m.is_some_and(|r| dist[next] <= r) {
                debug!("covering radius {:.1} m within limit after {} centers", dist[next], centers.len());
                break;
            }
            is_center[next] = true;
            centers.push(next);
            relax_from(&dense, next, &mut dist);
        }

        let objective = dist.iter().copied().fold(0.0, f64::max);
        debug!("k-center: {} centers, radius {:.1} m", centers.len(), objective);

        Ok(Placement {
            selected: centers.iter().map(|&i| dense.ids[i]).collect(),
            objective,
            per_node: dense.ids.iter().zip(&dist).map(|(&id, &d)| (id, d)).collect(),
        })
    }
}

/// The non-center with the largest distance, ties to the lowest index.
fn farthest(dist: &[f64], is_center: &[bool]) -> Option<usize> {
    (0..dist.len())
        .filter(|&i| !is_center[i])
        .max_by(|&a, &b| dist[a].total_cmp(&dist[b]).then(b.cmp(&a)))
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

/// Min-heap entry.  Ordering is reversed on cost; ties pop the lower index.
#[derive(Copy, Clone, PartialEq)]
struct Frontier {
    cost: f64,
    node: usize,
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Lower `dist` to account for a new center at `source`.
///
/// `dist` already holds shortest distances to the previous centers, so the
/// search only expands nodes it improves.
fn relax_from(graph: &DenseGraph, source: usize, dist: &mut [f64]) {
    dist[source] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(Frontier { cost: 0.0, node: source });

    while let Some(Frontier { cost, node }) = heap.pop() {
        // Stale entry.
        if cost > dist[node] {
            continue;
        }
        for (next, w) in graph.neighbors(node) {
            let c = cost + w;
            if c < dist[next] {
                dist[next] = c;
                heap.push(Frontier { cost: c, node: next });
            }
        }
    }
}
