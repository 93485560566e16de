//! Unit and scenario tests for rg-build.
//!
//! Geometry is laid out in metres around a point in Bratislava.  The road
//! engine is replaced by [`helpers::StraightRoad`], an east–west road with
//! 1 km segments.

#[cfg(test)]
mod helpers {
    use std::collections::BTreeSet;

    use rg_core::geo::METRES_PER_DEGREE;
    use rg_core::{GeoPoint, NodeId, RoadSegmentId, TripId};
    use rg_prep::PositionRecord;
    use rg_spatial::{RoadClass, RoadInfo, SpatialGraph};

    use crate::{RoadMatcher, SnappedPoint};

    pub fn origin() -> GeoPoint {
        GeoPoint::new(48.15, 17.10)
    }

    pub fn at(north: f64, east: f64) -> GeoPoint {
        origin().offset_m(north, east)
    }

    pub fn rec(north: f64, east: f64, ts: Option<i64>, trip: u32) -> PositionRecord {
        let p = at(north, east);
        PositionRecord::new(p.lat, p.lon, ts, TripId(trip))
    }

    /// Two straight lines crossing at the origin, 10 m spacing, 50 points
    /// each.  The north–south line skips the shared crossing point.
    pub fn crossing_points() -> Vec<PositionRecord> {
        let east_west = (-25..25).map(|i| rec(0.0, i as f64 * 10.0, Some(i64::from(i) + 25), 1));
        let north_south = (-25..25)
            .filter(|&i| i != 0)
            .map(|i| rec(i as f64 * 10.0, 0.0, Some(i64::from(i) + 1_025), 2));
        east_west.chain(north_south).collect()
    }

    pub fn components(g: &SpatialGraph) -> usize {
        let mut seen: BTreeSet<NodeId> = BTreeSet::new();
        let mut count = 0;
        for start in g.node_ids() {
            if !seen.insert(start) {
                continue;
            }
            count += 1;
            let mut stack = vec![start];
            while let Some(n) = stack.pop() {
                for nb in g.neighbors(n) {
                    if seen.insert(nb) {
                        stack.push(nb);
                    }
                }
            }
        }
        count
    }

    pub fn node_at(g: &SpatialGraph, p: GeoPoint) -> Option<NodeId> {
        g.nearest(p, 0.5).map(|(id, _)| id)
    }

    /// East–west road through the origin, cut into 1 km segments.  Points
    /// more than 150 m off the road fail to snap.
    pub struct StraightRoad;

    pub fn main_street() -> RoadInfo {
        RoadInfo {
            name:          Some("Hlavná".to_owned()),
            class:         Some(RoadClass::Primary),
            max_speed_kmh: Some(50.0),
        }
    }

    impl RoadMatcher for StraightRoad {
        fn snap_to_road(&self, pos: GeoPoint) -> Option<SnappedPoint> {
            let north = (pos.lat - origin().lat) * METRES_PER_DEGREE;
            if north.abs() > 150.0 {
                return None;
            }
            let east = (pos.lon - origin().lon) * METRES_PER_DEGREE * origin().lat.to_radians().cos();
            Some(SnappedPoint {
                pos:              GeoPoint::new(origin().lat, pos.lon),
                road:             main_street(),
                segment_length_m: 1_000.0,
                segment_id:       RoadSegmentId((east / 1_000.0).floor() as i64 as u64),
            })
        }
    }
}

// ── Triangulation ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod triangulate {
    use super::helpers::at;
    use crate::triangulate::delaunay_edges;

    #[test]
    fn degenerate_sizes() {
        assert!(delaunay_edges(&[]).is_empty());
        assert!(delaunay_edges(&[at(0.0, 0.0)]).is_empty());
        assert_eq!(delaunay_edges(&[at(0.0, 0.0), at(5.0, 5.0)]), vec![(0, 1)]);
    }

    #[test]
    fn collinear_points_are_chained_in_order() {
        let pts = [at(0.0, 30.0), at(0.0, 0.0), at(0.0, 20.0), at(0.0, 10.0), at(0.0, 40.0)];
        let mut edges = delaunay_edges(&pts);
        edges.sort_unstable();
        assert_eq!(edges, vec![(0, 2), (0, 4), (1, 3), (2, 3)]);
    }

    #[test]
    fn square_with_interior_point() {
        let pts = [at(0.0, 0.0), at(0.0, 100.0), at(100.0, 100.0), at(100.0, 0.0), at(45.0, 48.0)];
        let edges = delaunay_edges(&pts);
        for corner in 0..4 {
            assert!(edges.contains(&(corner, 4)));
        }
        assert_eq!(edges.len(), 8);
    }
}

// ── Graph builder ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rg_core::PipelineConfig;
    use rg_spatial::SpatialGraph;
    use super::helpers::{at, components, crossing_points, node_at, rec};
    use crate::builder::GABRIEL_TOLERANCE_M;
    use crate::{BuildPath, GraphBuilder};

    #[test]
    fn cold_crossing_lines() {
        let config = PipelineConfig::default();
        let mut g = SpatialGraph::new();
        let stats = GraphBuilder::new(&config).unwrap().build(&mut g, &crossing_points());

        assert_eq!(stats.path, BuildPath::Cold);
        assert_eq!(g.node_count(), 99);
        assert_eq!(g.edge_count(), 98);
        assert_eq!(components(&g), 1);

        let junction = node_at(&g, at(0.0, 0.0)).unwrap();
        assert_eq!(g.degree(junction), 4);
        assert!(g.nodes().filter(|n| n.id() != junction).all(|n| g.degree(n.id()) <= 2));
        assert!(g.nodes().all(|n| n.cell_id.is_some()));
        g.check_invariants().unwrap();
    }

    #[test]
    fn cold_result_is_gabriel() {
        let config = PipelineConfig::default();
        let mut g = SpatialGraph::new();
        let pts = vec![
            rec(0.0, 0.0, None, 1),
            rec(12.0, 30.0, None, 1),
            rec(-20.0, 55.0, None, 1),
            rec(35.0, 70.0, None, 1),
            rec(5.0, 95.0, None, 1),
            rec(40.0, 20.0, None, 1),
            rec(-30.0, 10.0, None, 1),
            rec(60.0, 50.0, None, 1),
        ];
        GraphBuilder::new(&config).unwrap().build(&mut g, &pts);
        assert!(g.edge_count() > 0);
        for e in g.edges() {
            let a = g.node(e.source()).unwrap().pos();
            let b = g.node(e.target()).unwrap().pos();
            let r = a.distance_m(b) * 0.5 - GABRIEL_TOLERANCE_M;
            assert!(g.in_radius(a.midpoint(b), r, &[e.source(), e.target()]).is_empty());
        }
        assert!(g.max_weight_drift_m() < 1e-9);
    }

    #[test]
    fn cold_prunes_long_edges() {
        let config = PipelineConfig::default();
        let mut g = SpatialGraph::new();
        let pts: Vec<_> = (0..5)
            .map(|i| rec(i as f64 * 10.0, 0.0, None, 1))
            .chain((0..5).map(|i| rec(i as f64 * 10.0, 1_000.0, None, 1)))
            .collect();
        let stats = GraphBuilder::new(&config).unwrap().build(&mut g, &pts);

        assert!(stats.length_pruned >= 1);
        assert!(g.edges().all(|e| e.distance_m() <= config.max_edge_length_m));
        assert_eq!(components(&g), 2);
        assert_eq!(g.edge_count(), 8);
    }

    #[test]
    fn cold_single_point_leaves_graph_empty() {
        let config = PipelineConfig::default();
        let mut g = SpatialGraph::new();
        let stats = GraphBuilder::new(&config).unwrap().build(&mut g, &[rec(0.0, 0.0, None, 1)]);
        assert!(g.is_empty());
        assert_eq!(stats.nodes_added, 0);
    }

    fn chain_graph() -> SpatialGraph {
        let mut g = SpatialGraph::new();
        let a = g.create_node(at(0.0, 0.0));
        let b = g.create_node(at(50.0, 0.0));
        let c = g.create_node(at(100.0, 0.0));
        g.add_edge_measured(a, b);
        g.add_edge_measured(b, c);
        g
    }

    #[test]
    fn warm_merge_at_existing_node() {
        let config = PipelineConfig::default();
        let mut g = chain_graph();
        let b = node_at(&g, at(50.0, 0.0)).unwrap();

        let stats = GraphBuilder::new(&config)
            .unwrap()
            .build(&mut g, &[rec(50.0, 0.0, Some(7), 1)]);

        assert_eq!(stats.path, BuildPath::Warm);
        assert_eq!(stats.points_merged, 1);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        let n = g.node(b).unwrap();
        assert_eq!(n.merge_count, 2);
        assert_eq!(n.first_seen, Some(7));
    }

    #[test]
    fn warm_merge_refreshes_weights() {
        let config = PipelineConfig::default();
        let mut g = chain_graph();
        GraphBuilder::new(&config).unwrap().build(&mut g, &[rec(50.0, 8.0, None, 1)]);
        assert_eq!(g.node_count(), 3);
        assert!(g.max_weight_drift_m() < 1e-9);
    }

    #[test]
    fn warm_new_node_local_gabriel() {
        let mut config = PipelineConfig::default();
        config.knn_k = 3;
        let mut g = chain_graph();
        let (a, b, c) = (
            node_at(&g, at(0.0, 0.0)).unwrap(),
            node_at(&g, at(50.0, 0.0)).unwrap(),
            node_at(&g, at(100.0, 0.0)).unwrap(),
        );

        // Nearest are b, a, c; the edge to c passes b inside its circle.
        let stats = GraphBuilder::new(&config)
            .unwrap()
            .build(&mut g, &[rec(45.0, 15.0, None, 1)]);
        let new = node_at(&g, at(45.0, 15.0)).unwrap();

        assert_eq!(stats.nodes_added, 1);
        assert_eq!(stats.edges_added, 2);
        assert_eq!(stats.gabriel_pruned, 1);
        assert_eq!(g.neighbors(new).collect::<Vec<_>>(), vec![a, b]);
        assert!(!g.has_edge(new, c));
        g.check_invariants().unwrap();
    }

    #[test]
    fn warm_isolated_point() {
        let config = PipelineConfig::default();
        let mut g = chain_graph();
        GraphBuilder::new(&config)
            .unwrap()
            .build(&mut g, &[rec(0.0, 1_000.0, None, 1)]);
        let far = node_at(&g, at(0.0, 1_000.0)).unwrap();
        assert_eq!(g.degree(far), 0);
        assert_eq!(components(&g), 2);
    }

    #[test]
    fn distance_gated_warm_merge() {
        let config = PipelineConfig::default();
        let mut g = chain_graph();
        GraphBuilder::new(&config)
            .unwrap()
            .build(&mut g, &[rec(50.0, 10.5, None, 1)]);
        assert_eq!(g.node_count(), 4);
    }
}

// ── Map matching ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod mapmatch {
    use rg_core::PipelineConfig;
    use rg_spatial::SpatialGraph;
    use super::helpers::{StraightRoad, at, main_street};
    use crate::{MapMatchAdapter, NoopMatcher};

    /// a, b close together near the road; c on the road 50 m east; d far off.
    fn graph() -> SpatialGraph {
        let mut g = SpatialGraph::new();
        let a = g.create_node(at(5.0, 0.0));
        let b = g.create_node(at(-3.0, 4.0));
        let c = g.create_node(at(2.0, 50.0));
        let d = g.create_node(at(200.0, 0.0));
        g.node_mut(b).unwrap().merge_count = 3;
        g.node_mut(a).unwrap().observe(900);
        g.add_edge_measured(a, b);
        g.add_edge_measured(a, c);
        g.add_edge_measured(a, d);
        g
    }

    #[test]
    fn snap_merge_enrich() {
        let config = PipelineConfig::default();
        let mut g = graph();
        let ids: Vec<_> = g.node_ids().collect();
        let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);

        let stats = MapMatchAdapter::new(&StraightRoad, &config).apply(&mut g);
        assert_eq!((stats.snapped, stats.off_road, stats.merged, stats.pruned), (3, 1, 1, 0));

        // a merged into b (higher merge count); b keeps its snapped position.
        assert!(!g.contains(a));
        let nb = g.node(b).unwrap();
        assert_eq!(nb.merge_count, 4);
        assert_eq!(nb.last_seen, Some(900));
        assert!(nb.pos().distance_m(at(0.0, 4.0)) < 0.01);
        assert_eq!(nb.road, main_street());

        assert!(g.has_edge(b, c));
        assert!(g.has_edge(b, d));
        assert!(g.node(d).unwrap().off_road);
        assert!(g.node(d).unwrap().road.is_empty());

        // Every edge touches b, whose road info wins.
        assert!(g.edges().all(|e| e.road == main_street()));
        assert!(g.max_weight_drift_m() < 1e-9);
        g.check_invariants().unwrap();
    }

    #[test]
    fn same_segment_far_apart_not_merged() {
        let config = PipelineConfig::default();
        let mut g = SpatialGraph::new();
        let x = g.create_node(at(1.0, 100.0));
        let y = g.create_node(at(-1.0, 160.0));
        g.add_edge_measured(x, y);

        let stats = MapMatchAdapter::new(&StraightRoad, &config).apply(&mut g);
        assert_eq!(stats.merged, 0);
        assert_eq!(g.node_count(), 2);
        assert!((g.edge(x, y).unwrap().distance_m() - 60.0).abs() < 0.1);
    }

    #[test]
    fn different_segments_not_merged() {
        let config = PipelineConfig::default();
        let mut g = SpatialGraph::new();
        g.create_node(at(0.0, 998.0));
        g.create_node(at(0.0, 1_002.0));
        let stats = MapMatchAdapter::new(&StraightRoad, &config).apply(&mut g);
        assert_eq!(stats.merged, 0);
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn snap_beyond_limit_is_off_road() {
        let config = PipelineConfig::default();
        let mut g = SpatialGraph::new();
        let n = g.create_node(at(120.0, 0.0));
        MapMatchAdapter::new(&StraightRoad, &config).apply(&mut g);
        let node = g.node(n).unwrap();
        assert!(node.off_road);
        assert!(node.pos().distance_m(at(120.0, 0.0)) < 1e-6);
    }

    #[test]
    fn enrichment_falls_back_to_other_endpoint() {
        let config = PipelineConfig::default();
        let mut g = SpatialGraph::new();
        let off = g.create_node(at(300.0, 0.0));
        let on = g.create_node(at(50.0, 0.0));
        g.node_mut(off).unwrap().merge_count = 5;
        g.add_edge_measured(off, on);

        MapMatchAdapter::new(&StraightRoad, &config).apply(&mut g);
        assert_eq!(g.edge(off, on).unwrap().road, main_street());
    }

    #[test]
    fn off_road_pruning() {
        let mut config = PipelineConfig::default();
        config.remove_off_road_nodes = true;
        let mut g = graph();
        let stats = MapMatchAdapter::new(&StraightRoad, &config).apply(&mut g);
        assert_eq!(stats.pruned, 1);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.nodes().all(|n| !n.off_road));
    }

    #[test]
    fn noop_matcher_marks_everything_off_road() {
        let config = PipelineConfig::default();
        let mut g = graph();
        let stats = MapMatchAdapter::new(&NoopMatcher, &config).apply(&mut g);
        assert_eq!(stats.off_road, 4);
        assert_eq!(g.node_count(), 4);
        assert!(g.edges().all(|e| e.road.is_empty()));
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pipeline {
    use rg_core::{GeoPoint, PipelineConfig};
    use rg_spatial::SpatialGraph;
    use super::helpers::{StraightRoad, at, components, crossing_points, node_at, rec};
    use crate::{
        BuildPath, PipelineBuilder, PipelineError, RoadMatcher, SnappedPoint,
    };

    #[test]
    fn invalid_config_rejected_at_build() {
        let bad = PipelineConfig { knn_k: 0, ..PipelineConfig::default() };
        assert!(matches!(PipelineBuilder::new(bad).build(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn empty_input_returns_existing() {
        let pipeline = PipelineBuilder::new(PipelineConfig::default()).build().unwrap();
        let mut existing = SpatialGraph::new();
        existing.create_node(at(0.0, 0.0));

        let (g, report) = pipeline.run(Some(existing), vec![]).unwrap();
        assert_eq!(g.node_count(), 1);
        assert!(report.build.is_none());

        let (g, _) = pipeline.run(None, vec![]).unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn crossing_lines_end_to_end() {
        let mut points = crossing_points();
        // The second line also passes through the crossing.
        points.push(rec(0.0, 0.0, Some(1_025), 2));

        let pipeline = PipelineBuilder::new(PipelineConfig::default()).build().unwrap();
        let (g, report) = pipeline.run(None, points).unwrap();

        assert_eq!(report.preprocess.input, 100);
        assert_eq!(report.preprocess.near_duplicates, 1);
        assert_eq!(report.hex_points, 99);
        assert_eq!(g.node_count(), 99);
        assert_eq!(components(&g), 1);

        let junction = node_at(&g, at(0.0, 0.0)).unwrap();
        assert_eq!(g.degree(junction), 4);
        assert_eq!(g.nodes().filter(|n| g.degree(n.id()) > 2).count(), 1);
        g.check_invariants().unwrap();
    }

    #[test]
    fn far_outlier_is_dropped() {
        let mut points: Vec<_> = (0..20).map(|i| rec(0.0, i as f64 * 10.0, Some(i), 1)).collect();
        points.push(rec(500_000.0, 0.0, Some(30), 1));

        let pipeline = PipelineBuilder::new(PipelineConfig::default()).build().unwrap();
        let (g, report) = pipeline.run(None, points).unwrap();
        assert_eq!(report.preprocess.out_of_bbox, 1);
        assert_eq!(g.node_count(), 20);
        assert_eq!(g.edge_count(), 19);
    }

    #[test]
    fn near_duplicate_pair_collapses() {
        let points = vec![rec(0.0, 0.0, Some(0), 1), rec(2.0, 0.0, Some(1), 1)];
        let pipeline = PipelineBuilder::new(PipelineConfig::default()).build().unwrap();
        let (g, report) = pipeline.run(None, points).unwrap();
        assert_eq!(report.preprocess.near_duplicates, 1);
        // The lone survivor has no neighbour and is removed as sparse.
        assert_eq!(report.preprocess.sparse, 1);
        assert!(g.is_empty());
    }

    #[test]
    fn warm_insert_at_existing_node() {
        let pipeline = PipelineBuilder::new(PipelineConfig::default()).build().unwrap();
        let line: Vec<_> = (0..20).map(|i| rec(0.0, i as f64 * 20.0, Some(i), 1)).collect();
        let (g, _) = pipeline.run(None, line).unwrap();
        let (nodes, edges) = (g.node_count(), g.edge_count());
        let target = node_at(&g, at(0.0, 100.0)).unwrap();

        let again = vec![rec(0.0, 100.0, Some(500), 2), rec(0.0, 120.0, Some(501), 2)];
        let (g, report) = pipeline.run(Some(g), again).unwrap();

        let build = report.build.unwrap();
        assert_eq!(build.path, BuildPath::Warm);
        assert_eq!(build.points_merged, 2);
        assert_eq!(g.node_count(), nodes);
        assert_eq!(g.edge_count(), edges);
        assert_eq!(g.node(target).unwrap().merge_count, 2);
        assert!(g.node(target).unwrap().pos().distance_m(at(0.0, 100.0)) < 1e-6);
    }

    /// Matches every trajectory by snapping its points onto the road.
    struct SnappingMatcher;

    impl RoadMatcher for SnappingMatcher {
        fn snap_to_road(&self, pos: GeoPoint) -> Option<SnappedPoint> {
            StraightRoad.snap_to_road(pos)
        }

        fn match_trajectory(&self, points: &[GeoPoint]) -> Option<Vec<GeoPoint>> {
            points.iter().map(|&p| self.snap_to_road(p).map(|s| s.pos)).collect()
        }
    }

    #[test]
    fn matched_trajectories_replace_raw_points() {
        let points: Vec<_> = (0..10).map(|i| rec(6.0, i as f64 * 30.0, Some(i), 1)).collect();
        let pipeline =
            PipelineBuilder::new(PipelineConfig::default()).matcher(SnappingMatcher).build().unwrap();
        let (g, report) = pipeline.run(None, points).unwrap();

        assert_eq!(report.trips, 1);
        assert_eq!(report.matched_trips, 1);
        assert_eq!(g.node_count(), 10);
        assert!(g.nodes().all(|n| n.pos().distance_m(GeoPoint::new(at(0.0, 0.0).lat, n.pos().lon)) < 0.01));
        assert!(g.nodes().all(|n| !n.off_road));
        assert_eq!(report.matching.unwrap().snapped, 10);
    }

    /// Returns a trajectory with one corrupt coordinate in it.
    struct CorruptMatcher(GeoPoint);

    impl RoadMatcher for CorruptMatcher {
        fn snap_to_road(&self, _pos: GeoPoint) -> Option<SnappedPoint> {
            None
        }

        fn match_trajectory(&self, points: &[GeoPoint]) -> Option<Vec<GeoPoint>> {
            let mut out = points.to_vec();
            out[2] = self.0;
            Some(out)
        }
    }

    #[test]
    fn invalid_matched_points_fall_back_to_raw() {
        for bad in [GeoPoint::new(f64::NAN, 17.1), GeoPoint::new(48.15, 250.0), GeoPoint::new(0.0, 0.0)] {
            let points: Vec<_> = (0..10).map(|i| rec(6.0, i as f64 * 30.0, Some(i), 1)).collect();
            let pipeline =
                PipelineBuilder::new(PipelineConfig::default()).matcher(CorruptMatcher(bad)).build().unwrap();
            let (g, report) = pipeline.run(None, points).unwrap();

            assert_eq!(report.trips, 1);
            assert_eq!(report.matched_trips, 0);
            assert_eq!(g.node_count(), 10);
            assert!(g.nodes().all(|n| n.pos().in_valid_range()));
            assert!(node_at(&g, at(6.0, 60.0)).is_some());
            g.check_invariants().unwrap();
        }
    }

    #[test]
    fn declined_trajectories_fall_back_to_raw() {
        let points: Vec<_> = (0..10).map(|i| rec(6.0, i as f64 * 30.0, Some(i), 1)).collect();
        let pipeline = PipelineBuilder::new(PipelineConfig::default()).matcher(StraightRoad).build().unwrap();
        let (g, report) = pipeline.run(None, points).unwrap();

        assert_eq!(report.trips, 1);
        assert_eq!(report.matched_trips, 0);
        assert_eq!(g.node_count(), 10);
        // Snapping still moves every node onto the road.
        assert_eq!(report.matching.unwrap().snapped, 10);
    }
}
