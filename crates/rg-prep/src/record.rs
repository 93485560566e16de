//! The raw input unit.

use rg_core::{GeoPoint, TripId};

/// One GPS fix as delivered by upstream ingestion.
///
/// `bearing_deg` is derived: trip segmentation fills it from the previous
/// fix of the same trip.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionRecord {
    pub pos:         GeoPoint,
    /// Unix seconds.
    pub timestamp:   Option<i64>,
    pub trip_id:     TripId,
    pub bearing_deg: Option<f64>,
}

impl PositionRecord {
    pub fn new(lat: f64, lon: f64, timestamp: Option<i64>, trip_id: TripId) -> Self {
        Self { pos: GeoPoint::new(lat, lon), timestamp, trip_id, bearing_deg: None }
    }

    /// Identity used for exact-duplicate collapsing: bit-exact position plus
    /// timestamp.  Trip and bearing do not participate.
    #[inline]
    pub(crate) fn fix_key(&self) -> (u64, u64, Option<i64>) {
        (self.pos.lat.to_bits(), self.pos.lon.to_bits(), self.timestamp)
    }
}
