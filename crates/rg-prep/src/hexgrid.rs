//! H3 hex-grid thinning.
//!
//! Bounds point density before graph construction: all fixes in one H3 cell
//! collapse to a single representative at their centroid.  Applying the
//! deduplicator to its own output changes nothing.

use h3o::{CellIndex, LatLng, Resolution};
use log::warn;
use rustc_hash::FxHashMap;

use rg_core::{GeoPoint, TripId};

use crate::{PositionRecord, PrepError, PrepResult};

/// Parse a raw resolution number.
pub fn resolution(res: u8) -> PrepResult<Resolution> {
    Resolution::try_from(res).map_err(|_| PrepError::Resolution(res))
}

/// The H3 cell containing `pos`, or `None` if H3 rejects the coordinate.
pub fn cell_of(pos: GeoPoint, res: Resolution) -> Option<CellIndex> {
    LatLng::new(pos.lat, pos.lon).ok().map(|ll| ll.to_cell(res))
}

/// Raw 64-bit H3 index of the cell containing `pos`, used as node metadata.
pub fn cell_id(pos: GeoPoint, res: Resolution) -> Option<u64> {
    cell_of(pos, res).map(u64::from)
}

pub struct HexGridDeduplicator {
    res: Resolution,
}

/// Running aggregate for one occupied cell.
struct Bucket {
    sum_lat:  f64,
    sum_lon:  f64,
    count:    u32,
    earliest: Option<i64>,
    trip_id:  TripId,
}

enum Slot {
    Cell(Bucket),
    Raw(PositionRecord),
}

impl HexGridDeduplicator {
    pub fn new(res: u8) -> PrepResult<Self> {
        Ok(Self { res: resolution(res)? })
    }

    /// Collapse each occupied cell to one record: centroid position,
    /// earliest present timestamp, trip id of the first fix seen.  Output is
    /// in order of each cell's first appearance.
    ///
    /// Fixes H3 cannot index are passed through untouched at their position
    /// in the sequence.
    pub fn dedup(&self, records: &[PositionRecord]) -> Vec<PositionRecord> {
        let mut by_cell: FxHashMap<CellIndex, usize> = FxHashMap::default();
        let mut entries: Vec<Slot> = Vec::new();

        for r in records {
            let Some(cell) = cell_of(r.pos, self.res) else {
                warn!("H3 rejected {}, keeping the fix as is", r.pos);
                entries.push(Slot::Raw(r.clone()));
                continue;
            };
            match by_cell.get(&cell) {
                Some(&i) => {
                    if let Slot::Cell(b) = &mut entries[i] {
                        b.sum_lat += r.pos.lat;
                        b.sum_lon += r.pos.lon;
                        b.count += 1;
                        b.earliest = match (b.earliest, r.timestamp) {
                            (Some(a), Some(t)) => Some(a.min(t)),
                            (a, t) => a.or(t),
                        };
                    }
                }
                None => {
                    by_cell.insert(cell, entries.len());
                    entries.push(Slot::Cell(Bucket {
                        sum_lat:  r.pos.lat,
                        sum_lon:  r.pos.lon,
                        count:    1,
                        earliest: r.timestamp,
                        trip_id:  r.trip_id,
                    }));
                }
            }
        }

        entries
            .into_iter()
            .map(|s| match s {
                Slot::Cell(b) => {
                    let n = b.count as f64;
                    PositionRecord::new(b.sum_lat / n, b.sum_lon / n, b.earliest, b.trip_id)
                }
                Slot::Raw(raw) => raw,
            })
            .collect()
    }
}
