//! Correcting a built graph against the road network.
//!
//! Runs in four passes over the whole graph:
//!
//! 1. snap every node, moving it onto the road or marking it off-road;
//! 2. merge nodes that snapped onto the same segment and lie within the
//!    merge threshold of each other;
//! 3. copy road metadata onto edges and recompute every edge weight;
//! 4. optionally drop nodes that stayed off-road.

use std::collections::BTreeMap;

use log::{debug, info};

use rg_core::{NodeId, PipelineConfig, RoadSegmentId};
use rg_spatial::SpatialGraph;

use crate::RoadMatcher;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchStats {
    pub snapped:  usize,
    pub off_road: usize,
    pub merged:   usize,
    pub pruned:   usize,
}

pub struct MapMatchAdapter<'a, M: RoadMatcher + ?Sized> {
    matcher: &'a M,
    config:  &'a PipelineConfig,
}

impl<'a, M: RoadMatcher + ?Sized> MapMatchAdapter<'a, M> {
    pub fn new(matcher: &'a M, config: &'a PipelineConfig) -> Self {
        Self { matcher, config }
    }

    pub fn apply(&self, graph: &mut SpatialGraph) -> MatchStats {
        let mut stats = MatchStats::default();

        let segments = self.snap_all(graph, &mut stats);
        stats.merged = self.merge_same_segment(graph, segments);
        enrich_edges(graph);
        graph.refresh_edge_weights();

        if self.config.remove_off_road_nodes {
            let off: Vec<NodeId> = graph.nodes().filter(|n| n.off_road).map(|n| n.id()).collect();
            for id in &off {
                graph.remove_node(*id);
            }
            stats.pruned = off.len();
        }

        info!(
            "map matching: {} snapped, {} off-road, {} merged, {} pruned",
            stats.snapped, stats.off_road, stats.merged, stats.pruned
        );
        stats
    }

    /// Returns the accepted segment of every snapped node, grouped by segment.
    fn snap_all(
        &self,
        graph: &mut SpatialGraph,
        stats: &mut MatchStats,
    ) -> BTreeMap<RoadSegmentId, Vec<NodeId>> {
        let mut segments: BTreeMap<RoadSegmentId, Vec<NodeId>> = BTreeMap::new();
        let mut too_far = 0;

        let ids: Vec<NodeId> = graph.node_ids().collect();
        for id in ids {
            let Some(pos) = graph.node(id).map(|n| n.pos()) else {
                continue;
            };
            let accepted = self
                .matcher
                .snap_to_road(pos)
                .filter(|s| {
                    let ok = pos.distance_m(s.pos) <= self.config.max_snap_distance_m;
                    too_far += usize::from(!ok);
                    ok
                });

            match accepted {
                Some(snap) => {
                    graph.move_node(id, snap.pos);
                    if let Some(node) = graph.node_mut(id) {
                        node.road = snap.road;
                        node.off_road = false;
                    }
                    segments.entry(snap.segment_id).or_default().push(id);
                    stats.snapped += 1;
                }
                None => {
                    if let Some(node) = graph.node_mut(id) {
                        node.off_road = true;
                    }
                    stats.off_road += 1;
                }
            }
        }

        if stats.off_road > 0 {
            debug!(
                "{} nodes off-road ({} snapped beyond {} m)",
                stats.off_road, too_far, self.config.max_snap_distance_m
            );
        }
        segments
    }

    /// Greedy pairwise merge within each segment.  Nodes are visited by
    /// descending merge count (ties: lower id); each absorbs every later
    /// node of its segment within the merge threshold.
    fn merge_same_segment(
        &self,
        graph: &mut SpatialGraph,
        segments: BTreeMap<RoadSegmentId, Vec<NodeId>>,
    ) -> usize {
        let threshold = self.config.merge_threshold_m;
        let mut merged = 0;

        for (_, mut members) in segments {
            if members.len() < 2 {
                continue;
            }
            members.sort_by_key(|&id| {
                let count = graph.node(id).map_or(0, |n| n.merge_count);
                (std::cmp::Reverse(count), id)
            });

            for (i, &survivor) in members.iter().enumerate() {
                let Some(anchor) = graph.node(survivor).map(|n| n.pos()) else {
                    continue;
                };
                for &other in &members[i + 1..] {
                    let close = graph
                        .node(other)
                        .is_some_and(|n| n.pos().distance_m(anchor) <= threshold);
                    if close && graph.contract_into(other, survivor) {
                        merged += 1;
                    }
                }
            }
        }
        merged
    }
}

/// Copy road metadata onto every edge from the endpoint with the higher
/// merge count (ties: lower id), or from the other endpoint when the
/// preferred one knows nothing about its road.
fn enrich_edges(graph: &mut SpatialGraph) {
    let updates: Vec<_> = graph
        .edges()
        .filter_map(|e| {
            let a = graph.node(e.source())?;
            let b = graph.node(e.target())?;
            let (first, second) = if b.merge_count > a.merge_count { (b, a) } else { (a, b) };
            let road = if first.road.is_empty() { &second.road } else { &first.road };
            (!road.is_empty()).then(|| (e.source(), e.target(), road.clone()))
        })
        .collect();

    for (a, b, road) in updates {
        if let Some(edge) = graph.edge_mut(a, b) {
            edge.road = road;
        }
    }
}
