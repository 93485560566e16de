//! Node and edge records stored in the [`SpatialGraph`](crate::SpatialGraph).
//!
//! Both are plain data keyed by [`NodeId`]; edges refer to their endpoints by
//! ID only, never by reference, so removing or merging a node cannot leave
//! anything dangling.  A node's position is readable everywhere but writable
//! only inside this crate: every move must go through the graph so the
//! R-tree stays in sync.

use std::hash::{Hash, Hasher};

use rg_core::{GeoPoint, NodeId};

use crate::RoadInfo;

// ── Node ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Node {
    id:  NodeId,
    pos: GeoPoint,

    /// Number of raw points averaged into `pos`.  Always ≥ 1.
    pub merge_count: u32,

    pub road: RoadInfo,

    /// Set by map matching when no usable road was found nearby.
    pub off_road: bool,

    /// Earliest / latest observation time (Unix seconds).  Only ever widen.
    pub first_seen: Option<i64>,
    pub last_seen:  Option<i64>,

    /// Coarse spatial partition cell (raw H3 index), metadata only.
    pub cell_id: Option<u64>,
}

impl Node {
    pub fn new(id: NodeId, pos: GeoPoint) -> Self {
        Self {
            id,
            pos,
            merge_count: 1,
            road:        RoadInfo::default(),
            off_road:    false,
            first_seen:  None,
            last_seen:   None,
            cell_id:     None,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn pos(&self) -> GeoPoint {
        self.pos
    }

    #[inline]
    pub(crate) fn set_pos(&mut self, pos: GeoPoint) {
        self.pos = pos;
    }

    /// Extend the first/last-seen range with `ts`.
    pub fn observe(&mut self, ts: i64) {
        if self.first_seen.is_none_or(|f| ts < f) {
            self.first_seen = Some(ts);
        }
        if self.last_seen.is_none_or(|l| ts > l) {
            self.last_seen = Some(ts);
        }
    }

    /// Widen this node's seen-range to cover `other`'s.
    pub fn observe_range(&mut self, other: &Node) {
        if let Some(f) = other.first_seen {
            self.observe(f);
        }
        if let Some(l) = other.last_seen {
            self.observe(l);
        }
    }

    /// Running weighted average: the current position carries weight
    /// `merge_count`, the new point weight 1.  Returns the new position;
    /// the caller is responsible for re-indexing.
    pub(crate) fn absorb(&mut self, point: GeoPoint, ts: Option<i64>) -> GeoPoint {
        let w = self.merge_count as f64;
        self.pos = GeoPoint::new(
            (self.pos.lat * w + point.lat) / (w + 1.0),
            (self.pos.lon * w + point.lon) / (w + 1.0),
        );
        self.merge_count += 1;
        if let Some(ts) = ts {
            self.observe(ts);
        }
        self.pos
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ── Edge ──────────────────────────────────────────────────────────────────────

/// Unordered node pair, stored with the smaller ID first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    lo: NodeId,
    hi: NodeId,
}

impl EdgeKey {
    #[inline]
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b { Self { lo: a, hi: b } } else { Self { lo: b, hi: a } }
    }

    #[inline]
    pub fn endpoints(self) -> (NodeId, NodeId) {
        (self.lo, self.hi)
    }
}

/// Undirected weighted edge.
#[derive(Clone, Debug)]
pub struct Edge {
    key:        EdgeKey,
    distance_m: f64,
    pub road:   RoadInfo,
}

impl Edge {
    pub(crate) fn new(key: EdgeKey, distance_m: f64) -> Self {
        Self { key, distance_m, road: RoadInfo::default() }
    }

    #[inline]
    pub fn key(&self) -> EdgeKey {
        self.key
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.key.lo
    }

    #[inline]
    pub fn target(&self) -> NodeId {
        self.key.hi
    }

    /// The endpoint that is not `id`.
    #[inline]
    pub fn other(&self, id: NodeId) -> NodeId {
        if self.key.lo == id { self.key.hi } else { self.key.lo }
    }

    /// Great-circle length in metres as of the last weight refresh.
    #[inline]
    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    #[inline]
    pub(crate) fn set_distance_m(&mut self, d: f64) {
        self.distance_m = d;
    }
}
