//! The road-matching capability, as consumed by the pipeline.
//!
//! The engine behind it (road network, HMM matcher) lives outside this
//! workspace.  Implementations must be safe for concurrent read-only use:
//! one loaded road network typically serves many pipeline runs.

use rg_core::{GeoPoint, RoadSegmentId};
use rg_spatial::RoadInfo;

/// A raw position projected onto the closest usable road.
#[derive(Clone, Debug, PartialEq)]
pub struct SnappedPoint {
    pub pos:              GeoPoint,
    pub road:             RoadInfo,
    /// Full length of the segment the point landed on.
    pub segment_length_m: f64,
    pub segment_id:       RoadSegmentId,
}

/// Snap and trajectory-match queries against an external road network.
///
/// Both methods signal failure with `None`; callers fall back (off-road
/// marking, raw points) and never treat it as an error.
pub trait RoadMatcher: Send + Sync {
    fn snap_to_road(&self, pos: GeoPoint) -> Option<SnappedPoint>;

    /// Match an ordered trajectory to the road network.  The default
    /// declines every trajectory.
    fn match_trajectory(&self, _points: &[GeoPoint]) -> Option<Vec<GeoPoint>> {
        None
    }
}

/// Knows no roads.  Every snap fails and every trajectory is declined.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopMatcher;

impl RoadMatcher for NoopMatcher {
    fn snap_to_road(&self, _pos: GeoPoint) -> Option<SnappedPoint> {
        None
    }
}
