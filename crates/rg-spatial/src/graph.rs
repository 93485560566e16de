//! The mutable spatial road graph.
//!
//! # Data layout
//!
//! Nodes live in an arena keyed by [`NodeId`] (a `BTreeMap`, so iteration is
//! in ID order, which is also insertion order).  Edges are keyed by the
//! unordered [`EdgeKey`] and mirrored in a per-node adjacency set.  Nothing
//! holds a reference to a node: every lookup goes through the ID maps.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) holds one `[lat, lon]` entry per node.  The node
//! map and the index are only ever touched together (node insertion,
//! [`remove_node`], [`move_node`], [`absorb_point`]), so the two cannot
//! drift apart.
//!
//! All spatial queries are two-phase: a rectangular envelope query against
//! the R-tree, then refinement by equirectangular distance.  Raw index hits
//! are never returned.
//!
//! [`remove_node`]: SpatialGraph::remove_node
//! [`move_node`]: SpatialGraph::move_node
//! [`absorb_point`]: SpatialGraph::absorb_point

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rstar::{AABB, RTree, RTreeObject};

use rg_core::{GeoPoint, NodeId};

use crate::node::{Edge, EdgeKey, Node};
use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone, Debug, PartialEq)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id:    NodeId,
}

impl NodeEntry {
    fn of(node: &Node) -> Self {
        Self { point: node.pos().as_array(), id: node.id() }
    }
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

// ── SpatialGraph ──────────────────────────────────────────────────────────────

/// Undirected weighted graph of road nodes with a spatial index.
///
/// Edge weights are the great-circle distance between endpoints.  Moving a
/// node does not touch its edges; call [`refresh_edges_of`] or
/// [`refresh_edge_weights`] once a batch of moves is done.
///
/// [`refresh_edges_of`]: Self::refresh_edges_of
/// [`refresh_edge_weights`]: Self::refresh_edge_weights
#[derive(Clone)]
pub struct SpatialGraph {
    nodes:     BTreeMap<NodeId, Node>,
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    edges:     BTreeMap<EdgeKey, Edge>,
    index:     RTree<NodeEntry>,
    next_id:   NodeId,
}

impl Default for SpatialGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpatialGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialGraph")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl SpatialGraph {
    pub fn new() -> Self {
        Self {
            nodes:     BTreeMap::new(),
            adjacency: BTreeMap::new(),
            edges:     BTreeMap::new(),
            index:     RTree::new(),
            next_id:   NodeId(0),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Node access ───────────────────────────────────────────────────────

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Mutable access to node metadata.  The position is not writable
    /// through this handle; use [`move_node`](Self::move_node).
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Nodes in ID (= insertion) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    // ── Edge access ───────────────────────────────────────────────────────

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        self.edges.get(&EdgeKey::new(a, b))
    }

    /// Mutable access to edge metadata.  The weight is maintained by the
    /// graph and is not writable through this handle.
    pub fn edge_mut(&mut self, a: NodeId, b: NodeId) -> Option<&mut Edge> {
        self.edges.get_mut(&EdgeKey::new(a, b))
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.contains_key(&EdgeKey::new(a, b))
    }

    /// Neighbours of `id` in ID order.  Empty for an unknown node.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency.get(&id).map_or(0, BTreeSet::len)
    }

    /// Edges touching `id`.  Empty for an unknown node.
    pub fn incident_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.neighbors(id)
            .filter_map(move |nb| self.edges.get(&EdgeKey::new(id, nb)))
    }

    // ── Mutation: nodes ───────────────────────────────────────────────────

    /// Allocate the next ID, place a fresh node at `pos`, and return its ID.
    pub fn create_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = self.next_id;
        self.insert(Node::new(id, pos));
        id
    }

    /// Insert a prepared node.  No-op (returns `false`) if its ID exists.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id()) {
            return false;
        }
        self.insert(node);
        true
    }

    /// Single choke point for node insertion: map, adjacency, and index.
    fn insert(&mut self, node: Node) {
        let id = node.id();
        if id >= self.next_id {
            self.next_id = id.next();
        }
        self.index.insert(NodeEntry::of(&node));
        self.adjacency.insert(id, BTreeSet::new());
        self.nodes.insert(id, node);
    }

    /// Remove a node together with its index entry and incident edges.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.index.remove(&NodeEntry::of(&node));
        for nb in self.adjacency.remove(&id).unwrap_or_default() {
            if let Some(set) = self.adjacency.get_mut(&nb) {
                set.remove(&id);
            }
            self.edges.remove(&EdgeKey::new(id, nb));
        }
        Some(node)
    }

    /// Relocate a node, keeping the index in sync.  Incident edge weights
    /// are left stale until the next refresh.
    pub fn move_node(&mut self, id: NodeId, pos: GeoPoint) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        self.index.remove(&NodeEntry::of(node));
        node.set_pos(pos);
        self.index.insert(NodeEntry::of(node));
        true
    }

    /// Merge a raw observation into node `id` by weighted average.
    pub fn absorb_point(&mut self, id: NodeId, point: GeoPoint, ts: Option<i64>) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        self.index.remove(&NodeEntry::of(node));
        node.absorb(point, ts);
        self.index.insert(NodeEntry::of(node));
        true
    }

    /// Fold `removed` into `survivor`: every edge of `removed` is re-pointed
    /// at `survivor` (weight recomputed, metadata kept unless `survivor`
    /// already had that edge), merge counts add up, and seen-ranges widen.
    /// The survivor keeps its own position.
    pub fn contract_into(&mut self, removed: NodeId, survivor: NodeId) -> bool {
        if removed == survivor || !self.contains(removed) || !self.contains(survivor) {
            return false;
        }

        let rewired: Vec<Edge> = self
            .incident_edges(removed)
            .filter(|e| e.other(removed) != survivor)
            .cloned()
            .collect();

        let Some(gone) = self.remove_node(removed) else {
            return false;
        };

        for old in rewired {
            let nb = old.other(removed);
            if self.add_edge_measured(survivor, nb) {
                if let Some(e) = self.edges.get_mut(&EdgeKey::new(survivor, nb)) {
                    e.road = old.road;
                }
            }
        }

        if let Some(s) = self.nodes.get_mut(&survivor) {
            s.merge_count += gone.merge_count;
            s.observe_range(&gone);
        }
        true
    }

    // ── Mutation: edges ───────────────────────────────────────────────────

    /// Add an undirected edge with the given weight.
    ///
    /// No-op (returns `false`) for self-loops, unknown endpoints and
    /// existing edges.  An existing edge keeps its weight.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, distance_m: f64) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        let key = EdgeKey::new(a, b);
        if self.edges.contains_key(&key) {
            return false;
        }
        self.edges.insert(key, Edge::new(key, distance_m));
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        true
    }

    /// Like [`add_edge`](Self::add_edge) with the weight taken from the
    /// current endpoint positions.
    pub fn add_edge_measured(&mut self, a: NodeId, b: NodeId) -> bool {
        match (self.node(a), self.node(b)) {
            (Some(na), Some(nb)) => {
                let d = na.pos().distance_m(nb.pos());
                self.add_edge(a, b, d)
            }
            _ => false,
        }
    }

    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> Option<Edge> {
        let edge = self.edges.remove(&EdgeKey::new(a, b))?;
        if let Some(set) = self.adjacency.get_mut(&a) {
            set.remove(&b);
        }
        if let Some(set) = self.adjacency.get_mut(&b) {
            set.remove(&a);
        }
        Some(edge)
    }

    // ── Edge weights ──────────────────────────────────────────────────────

    /// Recompute every edge weight from current endpoint positions.
    pub fn refresh_edge_weights(&mut self) {
        let nodes = &self.nodes;
        for edge in self.edges.values_mut() {
            let (a, b) = edge.key().endpoints();
            if let (Some(na), Some(nb)) = (nodes.get(&a), nodes.get(&b)) {
                edge.set_distance_m(na.pos().distance_m(nb.pos()));
            }
        }
    }

    /// Recompute the weights of edges incident to any of `ids`.
    pub fn refresh_edges_of(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        let mut keys = BTreeSet::new();
        for id in ids {
            for nb in self.neighbors(id) {
                keys.insert(EdgeKey::new(id, nb));
            }
        }
        for key in keys {
            let (a, b) = key.endpoints();
            let d = match (self.nodes.get(&a), self.nodes.get(&b)) {
                (Some(na), Some(nb)) => na.pos().distance_m(nb.pos()),
                _ => continue,
            };
            if let Some(e) = self.edges.get_mut(&key) {
                e.set_distance_m(d);
            }
        }
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Candidates within `radius_m` of `pos`, unsorted, refined by distance.
    fn candidates(&self, pos: GeoPoint, radius_m: f64) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let (lo, hi) = pos.degree_envelope(radius_m);
        self.index
            .locate_in_envelope(&AABB::from_corners(lo, hi))
            .map(move |e| (e.id, pos.approx_distance_m(GeoPoint::new(e.point[0], e.point[1]))))
            .filter(move |&(_, d)| d <= radius_m)
    }

    /// The closest node within `max_dist_m`, ties broken by lower ID.
    pub fn nearest(&self, pos: GeoPoint, max_dist_m: f64) -> Option<(NodeId, f64)> {
        self.candidates(pos, max_dist_m)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
    }

    /// Up to `k` nodes within `max_dist_m`, ascending by distance, ties
    /// broken by insertion order.
    pub fn k_nearest(&self, pos: GeoPoint, k: usize, max_dist_m: f64) -> Vec<(NodeId, f64)> {
        let mut found: Vec<(NodeId, f64)> = self.candidates(pos, max_dist_m).collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        found.truncate(k);
        found
    }

    /// Every node within `radius_m` of `pos` except those in `exclude`,
    /// ascending by distance.
    pub fn in_radius(&self, pos: GeoPoint, radius_m: f64, exclude: &[NodeId]) -> Vec<(NodeId, f64)> {
        let mut found: Vec<(NodeId, f64)> = self
            .candidates(pos, radius_m)
            .filter(|(id, _)| !exclude.contains(id))
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        found
    }

    // ── Consistency ───────────────────────────────────────────────────────

    /// Verify the structural invariants: index ⇔ node map, edges reference
    /// live nodes, adjacency mirrors the edge set.
    pub fn check_invariants(&self) -> SpatialResult<()> {
        if self.index.size() != self.nodes.len() {
            return Err(SpatialError::Invariant(format!(
                "index holds {} entries for {} nodes",
                self.index.size(),
                self.nodes.len()
            )));
        }
        for node in self.nodes.values() {
            let indexed = self
                .index
                .locate_in_envelope(&AABB::from_point(node.pos().as_array()))
                .any(|e| e.id == node.id());
            if !indexed {
                return Err(SpatialError::Invariant(format!(
                    "{} missing from index at {}",
                    node.id(),
                    node.pos()
                )));
            }
        }

        let mut adjacency_edges = 0;
        for (&id, set) in &self.adjacency {
            if !self.nodes.contains_key(&id) {
                return Err(SpatialError::Invariant(format!("adjacency for unknown {id}")));
            }
            for &nb in set {
                if !self.edges.contains_key(&EdgeKey::new(id, nb)) {
                    return Err(SpatialError::Invariant(format!(
                        "adjacency {id}–{nb} without edge"
                    )));
                }
            }
            adjacency_edges += set.len();
        }
        if adjacency_edges != 2 * self.edges.len() {
            return Err(SpatialError::Invariant("adjacency is not symmetric".into()));
        }

        for key in self.edges.keys() {
            let (a, b) = key.endpoints();
            if !self.nodes.contains_key(&a) || !self.nodes.contains_key(&b) {
                return Err(SpatialError::Invariant(format!("edge {a}–{b} has a missing endpoint")));
            }
        }
        Ok(())
    }

    /// Largest gap between a stored edge weight and the current endpoint
    /// distance.  Zero right after a refresh.
    pub fn max_weight_drift_m(&self) -> f64 {
        self.edges
            .values()
            .filter_map(|e| {
                let a = self.nodes.get(&e.source())?;
                let b = self.nodes.get(&e.target())?;
                Some((a.pos().distance_m(b.pos()) - e.distance_m()).abs())
            })
            .fold(0.0, f64::max)
    }
}
