//! A two-road stand-in for the external road-matching engine.
//!
//! Einsteinova runs west–east, Bajkalská south–north, crossing near the
//! middle of both.  Each road is cut into 250 m segments.

use rg_build::{RoadMatcher, SnappedPoint};
use rg_core::geo::METRES_PER_DEGREE;
use rg_core::{GeoPoint, RoadSegmentId};
use rg_spatial::{RoadClass, RoadInfo};

const SEGMENT_M:  f64 = 250.0;
const MAX_SNAP_M: f64 = 150.0;

struct Road {
    info:    RoadInfo,
    start:   GeoPoint,
    /// End of the road in metres `(north, east)` from `start`.
    end_m:   (f64, f64),
    id_base: u64,
}

impl Road {
    /// `(along_m, offset_m, snapped position)` of the closest point on the road.
    fn project(&self, p: GeoPoint) -> (f64, f64, GeoPoint) {
        let k = self.start.lat.to_radians().cos();
        let north = (p.lat - self.start.lat) * METRES_PER_DEGREE;
        let east = (p.lon - self.start.lon) * METRES_PER_DEGREE * k;
        let (dn, de) = self.end_m;
        let len2 = dn * dn + de * de;
        let t = ((north * dn + east * de) / len2).clamp(0.0, 1.0);
        let (fn_, fe) = (t * dn, t * de);
        let offset = ((north - fn_).powi(2) + (east - fe).powi(2)).sqrt();
        (t * len2.sqrt(), offset, self.start.offset_m(fn_, fe))
    }
}

pub struct CorridorRoads {
    roads: Vec<Road>,
}

impl CorridorRoads {
    pub fn new(origin: GeoPoint) -> Self {
        let road = |name: &str, class, speed| RoadInfo {
            name:          Some(name.to_owned()),
            class:         Some(class),
            max_speed_kmh: Some(speed),
        };
        Self {
            roads: vec![
                Road {
                    info:    road("Einsteinova", RoadClass::Trunk, 70.0),
                    start:   origin.offset_m(0.0, -1_500.0),
                    end_m:   (0.0, 3_000.0),
                    id_base: 1_000,
                },
                Road {
                    info:    road("Bajkalská", RoadClass::Primary, 50.0),
                    start:   origin.offset_m(-1_000.0, 0.0),
                    end_m:   (2_000.0, 0.0),
                    id_base: 2_000,
                },
            ],
        }
    }
}

impl RoadMatcher for CorridorRoads {
    fn snap_to_road(&self, pos: GeoPoint) -> Option<SnappedPoint> {
        let (road, (along, offset, snapped)) = self
            .roads
            .iter()
            .map(|r| (r, r.project(pos)))
            .min_by(|a, b| a.1.1.total_cmp(&b.1.1))?;
        if offset > MAX_SNAP_M {
            return None;
        }
        Some(SnappedPoint {
            pos:              snapped,
            road:             road.info.clone(),
            segment_length_m: SEGMENT_M,
            segment_id:       RoadSegmentId(road.id_base + (along / SEGMENT_M) as u64),
        })
    }

    /// Accept a trajectory only when every fix snaps.
    fn match_trajectory(&self, points: &[GeoPoint]) -> Option<Vec<GeoPoint>> {
        points.iter().map(|&p| self.snap_to_road(p).map(|s| s.pos)).collect()
    }
}
