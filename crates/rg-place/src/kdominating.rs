//! Randomised greedy k-hop dominating set.
//!
//! Repeatedly picks a uniformly random uncovered node and covers everything
//! within `k` hops of it.  The result is a feasible cover, not an
//! approximation of the minimum one; its objective is simply its size.

use std::collections::VecDeque;

use log::debug;

use rg_core::SeedRng;
use rg_spatial::SpatialGraph;

use crate::csr::DenseGraph;
use crate::{Placement, PlacementError, PlacementParams, PlacementResult, PlacementStrategy};

const NOT_IN_POOL: usize = usize::MAX;
const UNREACHED:   usize = usize::MAX;

pub struct KDominatingSet {
    rng: SeedRng,
}

impl KDominatingSet {
    pub fn new(rng: SeedRng) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SeedRng::new(seed))
    }
}

impl PlacementStrategy for KDominatingSet {
    fn name(&self) -> &'static str {
        "k-dominating-set"
    }

    /// `params.k` is a hop bound.  `max_radius_m` is ignored.
    fn place(&mut self, graph: &SpatialGraph, params: &PlacementParams) -> PlacementResult<Placement> {
        let k = params.k;
        if k == 0 {
            return Err(PlacementError::ZeroK);
        }
        let dense = DenseGraph::from_graph(graph);
        let n = dense.node_count();
        if n == 0 {
            return Ok(Placement::default());
        }

        let mut pool = UncoveredPool::new(n);
        let mut bfs = HopBfs::new(n);
        let mut selected: Vec<usize> = Vec::new();
        while !pool.is_empty() {
            let pick = pool.sample(&mut self.rng);
            selected.push(pick);
            for &covered in bfs.ball(&dense, &[pick], k) {
                pool.remove(covered);
            }
        }

        bfs.ball(&dense, &selected, k);
        debug!("k-dominating set: {} of {} nodes selected for k = {}", selected.len(), n, k);

        Ok(Placement {
            selected:  selected.iter().map(|&i| dense.ids[i]).collect(),
            objective: selected.len() as f64,
            per_node:  dense
                .ids
                .iter()
                .enumerate()
                .map(|(i, &id)| (id, bfs.hops(i).unwrap_or(k + 1) as f64))
                .collect(),
        })
    }
}

/// Uncovered nodes with O(1) uniform sampling and removal.
struct UncoveredPool {
    items: Vec<usize>,
    slot:  Vec<usize>,
}

impl UncoveredPool {
    fn new(n: usize) -> Self {
        Self { items: (0..n).collect(), slot: (0..n).collect() }
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn sample(&self, rng: &mut SeedRng) -> usize {
        self.items[rng.index(self.items.len())]
    }

    fn remove(&mut self, node: usize) {
        let at = self.slot[node];
        if at == NOT_IN_POOL {
            return;
        }
        self.items.swap_remove(at);
        if let Some(&moved) = self.items.get(at) {
            self.slot[moved] = at;
        }
        self.slot[node] = NOT_IN_POOL;
    }
}

/// Bounded multi-source BFS with a buffer reused across calls.
///
/// Only the nodes reached by the previous call are reset, so one call costs
/// its own `k`-hop neighbourhood rather than the whole graph.
pub(crate) struct HopBfs {
    hops:    Vec<usize>,
    touched: Vec<usize>,
    queue:   VecDeque<usize>,
}

impl HopBfs {
    pub(crate) fn new(n: usize) -> Self {
        Self { hops: vec![UNREACHED; n], touched: Vec::new(), queue: VecDeque::new() }
    }

    /// Every node within `k` hops of `sources`, in visiting order.
    pub(crate) fn ball(&mut self, graph: &DenseGraph, sources: &[usize], k: usize) -> &[usize] {
        for &node in &self.touched {
            self.hops[node] = UNREACHED;
        }
        self.touched.clear();
        self.queue.clear();

        for &s in sources {
            if self.hops[s] == UNREACHED {
                self.hops[s] = 0;
                self.touched.push(s);
                self.queue.push_back(s);
            }
        }
        while let Some(node) = self.queue.pop_front() {
            let h = self.hops[node];
            if h == k {
                continue;
            }
            for (next, _) in graph.neighbors(node) {
                if self.hops[next] == UNREACHED {
                    self.hops[next] = h + 1;
                    self.touched.push(next);
                    self.queue.push_back(next);
                }
            }
        }
        &self.touched
    }

    /// Hop count of `node` from the last call's sources, if within `k`.
    pub(crate) fn hops(&self, node: usize) -> Option<usize> {
        let h = self.hops[node];
        (h != UNREACHED).then_some(h)
    }
}
