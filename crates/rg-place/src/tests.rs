//! Unit tests for rg-place.
//!
//! Graphs are small hand-built grids and paths; optimal k-center radii are
//! found by brute force over all center subsets.

#[cfg(test)]
mod helpers {
    use std::collections::{BTreeMap, VecDeque};

    use rg_core::{GeoPoint, NodeId};
    use rg_spatial::SpatialGraph;

    pub fn origin() -> GeoPoint {
        GeoPoint::new(48.15, 17.10)
    }

    /// `n` nodes due north, `spacing_m` apart, chained.
    pub fn path(n: usize, spacing_m: f64) -> (SpatialGraph, Vec<NodeId>) {
        let mut g = SpatialGraph::new();
        let ids: Vec<NodeId> = (0..n)
            .map(|i| g.create_node(origin().offset_m(i as f64 * spacing_m, 0.0)))
            .collect();
        for w in ids.windows(2) {
            g.add_edge_measured(w[0], w[1]);
        }
        (g, ids)
    }

    /// `rows × cols` lattice with 4-neighbour edges.  Positions are
    /// jittered so edge weights differ.
    pub fn grid(rows: usize, cols: usize, spacing_m: f64) -> SpatialGraph {
        let mut g = SpatialGraph::new();
        let mut ids = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let jitter = ((r * 7 + c * 13) % 5) as f64 * 3.0;
                let p = origin().offset_m(r as f64 * spacing_m + jitter, c as f64 * spacing_m - jitter);
                ids.push(g.create_node(p));
            }
        }
        for r in 0..rows {
            for c in 0..cols {
                let here = ids[r * cols + c];
                if c + 1 < cols {
                    g.add_edge_measured(here, ids[r * cols + c + 1]);
                }
                if r + 1 < rows {
                    g.add_edge_measured(here, ids[(r + 1) * cols + c]);
                }
            }
        }
        g
    }

    /// All-pairs shortest path lengths (Floyd–Warshall).
    pub fn all_pairs(g: &SpatialGraph) -> (Vec<NodeId>, Vec<Vec<f64>>) {
        let ids: Vec<NodeId> = g.node_ids().collect();
        let n = ids.len();
        let mut d = vec![vec![f64::INFINITY; n]; n];
        for i in 0..n {
            d[i][i] = 0.0;
            for j in 0..n {
                if let Some(e) = g.edge(ids[i], ids[j]) {
                    d[i][j] = e.distance_m();
                }
            }
        }
        for m in 0..n {
            for i in 0..n {
                for j in 0..n {
                    if d[i][m] + d[m][j] < d[i][j] {
                        d[i][j] = d[i][m] + d[m][j];
                    }
                }
            }
        }
        (ids, d)
    }

    /// Optimal k-center radius by exhaustive search.
    pub fn optimal_radius(g: &SpatialGraph, k: usize) -> f64 {
        let (ids, d) = all_pairs(g);
        let n = ids.len();
        let mut best = f64::INFINITY;
        let mut chosen = Vec::with_capacity(k);
        subsets(n, k, 0, &mut chosen, &mut |centers| {
            let radius = (0..n)
                .map(|v| centers.iter().map(|&c| d[c][v]).fold(f64::INFINITY, f64::min))
                .fold(0.0, f64::max);
            best = best.min(radius);
        });
        best
    }

    fn subsets(n: usize, k: usize, from: usize, chosen: &mut Vec<usize>, f: &mut dyn FnMut(&[usize])) {
        if chosen.len() == k {
            f(chosen);
            return;
        }
        for i in from..n {
            chosen.push(i);
            subsets(n, k, i + 1, chosen, f);
            chosen.pop();
        }
    }

    /// Hop distance from each node to the nearest of `sources`.
    pub fn hops_to(g: &SpatialGraph, sources: &[NodeId]) -> BTreeMap<NodeId, usize> {
        let mut hops: BTreeMap<NodeId, usize> = sources.iter().map(|&s| (s, 0)).collect();
        let mut queue: VecDeque<NodeId> = sources.iter().copied().collect();
        while let Some(n) = queue.pop_front() {
            let h = hops[&n];
            for nb in g.neighbors(n) {
                if !hops.contains_key(&nb) {
                    hops.insert(nb, h + 1);
                    queue.push_back(nb);
                }
            }
        }
        hops
    }
}

// ── Dense snapshot ────────────────────────────────────────────────────────────

#[cfg(test)]
mod csr {
    use super::helpers::{grid, path};
    use crate::csr::DenseGraph;

    #[test]
    fn mirrors_graph() {
        let g = grid(3, 4, 50.0);
        let dense = DenseGraph::from_graph(&g);
        assert_eq!(dense.node_count(), 12);
        assert_eq!(dense.adj_to.len(), 2 * g.edge_count());
        for (i, &id) in dense.ids.iter().enumerate() {
            assert_eq!(dense.degree(i), g.degree(id));
            for (j, w) in dense.neighbors(i) {
                let e = g.edge(id, dense.ids[j]).unwrap();
                assert_eq!(w, e.distance_m());
            }
        }
    }

    #[test]
    fn ids_ascending() {
        let (mut g, ids) = path(4, 10.0);
        g.remove_node(ids[1]);
        let dense = DenseGraph::from_graph(&g);
        assert_eq!(dense.ids, vec![ids[0], ids[2], ids[3]]);
        assert_eq!(dense.degree(0), 0);
        assert_eq!(dense.degree(1), 1);
    }
}

// ── K-center ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod kcenter {
    use rg_spatial::SpatialGraph;
    use super::helpers::{grid, optimal_radius, origin, path};
    use crate::{KCenter, PlacementError, PlacementParams, PlacementStrategy};

    #[test]
    fn zero_k_is_an_error() {
        let (g, _) = path(3, 10.0);
        assert_eq!(KCenter.place(&g, &PlacementParams::new(0)), Err(PlacementError::ZeroK));
    }

    #[test]
    fn empty_graph() {
        let p = KCenter.place(&SpatialGraph::new(), &PlacementParams::new(3)).unwrap();
        assert!(p.is_empty());
        assert_eq!(p.objective, 0.0);
    }

    #[test]
    fn k_at_least_n_selects_everything() {
        let (g, ids) = path(4, 10.0);
        let p = KCenter.place(&g, &PlacementParams::new(9)).unwrap();
        assert_eq!(p.selected, ids);
        assert_eq!(p.objective, 0.0);
        assert!(p.per_node.values().all(|&d| d == 0.0));
    }

    #[test]
    fn path_farthest_first() {
        let (g, ids) = path(5, 100.0);
        let p = KCenter.place(&g, &PlacementParams::new(2)).unwrap();
        // Max degree first (lowest id among the inner nodes), then the far end.
        assert_eq!(p.selected, vec![ids[1], ids[4]]);
        assert!((p.objective - 100.0).abs() < 0.01);
        assert!((p.per_node[&ids[2]] - 100.0).abs() < 0.01);
        assert_eq!(p.per_node[&ids[4]], 0.0);
    }

    #[test]
    fn within_twice_optimal() {
        let graphs = [grid(3, 3, 80.0), grid(2, 4, 40.0), path(8, 25.0).0];
        for g in &graphs {
            for k in 1..=4 {
                let p = KCenter.place(g, &PlacementParams::new(k)).unwrap();
                let opt = optimal_radius(g, k);
                assert_eq!(p.selected.len(), k);
                assert!(p.objective <= 2.0 * opt + 1e-9, "k = {k}: {} > 2 × {opt}", p.objective);
                let worst = p.per_node.values().copied().fold(0.0, f64::max);
                assert_eq!(worst, p.objective);
            }
        }
    }

    #[test]
    fn every_component_gets_a_center() {
        let (mut g, ids) = path(3, 50.0);
        let far_a = g.create_node(origin().offset_m(0.0, 5_000.0));
        let far_b = g.create_node(origin().offset_m(20.0, 5_000.0));
        g.add_edge_measured(far_a, far_b);

        let p = KCenter.place(&g, &PlacementParams::new(2)).unwrap();
        assert_eq!(p.selected[0], ids[1]);
        assert!(p.selected[1] == far_a || p.selected[1] == far_b);
        assert!(p.objective.is_finite());

        let p = KCenter.place(&g, &PlacementParams::new(1)).unwrap();
        assert_eq!(p.objective, f64::INFINITY);
    }

    #[test]
    fn max_radius_stops_early() {
        let (g, _) = path(5, 100.0);
        let p = KCenter.place(&g, &PlacementParams::new(4).with_max_radius(150.0)).unwrap();
        assert_eq!(p.selected.len(), 2);
        assert!(p.objective <= 150.0);
    }

    #[test]
    fn deterministic() {
        let g = grid(4, 4, 60.0);
        let a = KCenter.place(&g, &PlacementParams::new(3)).unwrap();
        let b = KCenter.place(&g, &PlacementParams::new(3)).unwrap();
        assert_eq!(a, b);
    }
}

// ── K-dominating set ──────────────────────────────────────────────────────────

#[cfg(test)]
mod kdominating {
    use rg_spatial::SpatialGraph;
    use super::helpers::{grid, hops_to, origin, path};
    use crate::csr::DenseGraph;
    use crate::kdominating::HopBfs;
    use crate::{KDominatingSet, PlacementError, PlacementParams, PlacementStrategy};

    #[test]
    fn zero_k_is_an_error() {
        let (g, _) = path(3, 10.0);
        let err = KDominatingSet::seeded(1).place(&g, &PlacementParams::new(0));
        assert_eq!(err, Err(PlacementError::ZeroK));
    }

    #[test]
    fn empty_graph() {
        let p = KDominatingSet::seeded(1).place(&SpatialGraph::new(), &PlacementParams::new(2)).unwrap();
        assert!(p.is_empty());
        assert_eq!(p.objective, 0.0);
    }

    #[test]
    fn covers_every_node_within_k_hops() {
        let g = grid(5, 5, 30.0);
        for k in 1..=3 {
            for seed in 0..10 {
                let p = KDominatingSet::seeded(seed).place(&g, &PlacementParams::new(k)).unwrap();
                let hops = hops_to(&g, &p.selected);
                for id in g.node_ids() {
                    assert!(hops[&id] <= k, "seed {seed}, k {k}: {id} uncovered");
                    assert_eq!(p.per_node[&id], hops[&id] as f64);
                }
                assert_eq!(p.objective, p.selected.len() as f64);
            }
        }
    }

    #[test]
    fn same_seed_same_cover() {
        let g = grid(4, 6, 30.0);
        let params = PlacementParams::new(1);
        let a = KDominatingSet::seeded(42).place(&g, &params).unwrap();
        let b = KDominatingSet::seeded(42).place(&g, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn isolated_nodes_are_all_selected() {
        let mut g = SpatialGraph::new();
        for i in 0..4 {
            g.create_node(origin().offset_m(i as f64 * 1_000.0, 0.0));
        }
        let p = KDominatingSet::seeded(7).place(&g, &PlacementParams::new(3)).unwrap();
        assert_eq!(p.selected.len(), 4);
    }

    #[test]
    fn large_k_needs_one_node() {
        let (g, _) = path(6, 10.0);
        let p = KDominatingSet::seeded(3).place(&g, &PlacementParams::new(5)).unwrap();
        assert_eq!(p.selected.len(), 1);
    }

    #[test]
    fn bounded_bfs_touches_only_its_neighbourhood() {
        let (g, _) = path(50, 10.0);
        let dense = DenseGraph::from_graph(&g);
        let mut bfs = HopBfs::new(dense.node_count());

        let mut first = bfs.ball(&dense, &[0], 2).to_vec();
        first.sort_unstable();
        assert_eq!(first, vec![0, 1, 2]);

        // The second call forgets the first ball and reaches only its own.
        let mut second = bfs.ball(&dense, &[40], 2).to_vec();
        second.sort_unstable();
        assert_eq!(second, vec![38, 39, 40, 41, 42]);
        assert_eq!(bfs.hops(0), None);
        assert_eq!(bfs.hops(42), Some(2));
        assert_eq!(bfs.hops(43), None);

        // Several sources: each node takes its nearest.
        bfs.ball(&dense, &[10, 14], 3);
        assert_eq!(bfs.hops(12), Some(2));
        assert_eq!(bfs.hops(13), Some(1));
        assert_eq!(bfs.hops(17), Some(3));
        assert_eq!(bfs.hops(18), None);
    }

    #[test]
    fn max_radius_ignored() {
        let (g, _) = path(6, 10.0);
        let plain = KDominatingSet::seeded(9).place(&g, &PlacementParams::new(1)).unwrap();
        let capped = KDominatingSet::seeded(9)
            .place(&g, &PlacementParams::new(1).with_max_radius(1.0))
            .unwrap();
        assert_eq!(plain, capped);
    }
}
