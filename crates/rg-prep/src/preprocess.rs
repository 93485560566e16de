//! Noise filtering for raw GPS fixes.
//!
//! The filters run in a fixed order, each on the survivors of the previous:
//!
//! | # | Filter             | Drops                                            |
//! |---|--------------------|--------------------------------------------------|
//! | 1 | validity           | out-of-range coordinates, null island            |
//! | 2 | bounding box       | fixes outside the operating region               |
//! | 3 | chronological sort | nothing (stable, untimed fixes last)             |
//! | 4 | speed              | fixes implying an impossible jump within a trip  |
//! | 5 | exact duplicates   | repeats of `(lat, lon, timestamp)`               |
//! | 6 | near duplicates    | fixes within the threshold of a kept fix         |
//! | 7 | density            | fixes with too few neighbours                    |
//!
//! Anomalies are never errors.  Every drop is counted in [`PreprocessStats`].

use log::{debug, info};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use rustc_hash::{FxHashMap, FxHashSet};

use rg_core::geo::METRES_PER_DEGREE;
use rg_core::{GeoPoint, PipelineConfig, TripId};

use crate::PositionRecord;

/// Drop counts per filter, plus input and output sizes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreprocessStats {
    pub input:            usize,
    pub invalid:          usize,
    pub out_of_bbox:      usize,
    pub speed_outliers:   usize,
    pub exact_duplicates: usize,
    pub near_duplicates:  usize,
    pub sparse:           usize,
    pub output:           usize,
}

impl PreprocessStats {
    pub fn dropped(&self) -> usize {
        self.input - self.output
    }
}

/// Runs the filter chain with the thresholds of one [`PipelineConfig`].
pub struct Preprocessor<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Preprocessor<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Clean `records`.  The output is chronologically ordered (untimed
    /// fixes last) and may be empty.
    pub fn run(&self, records: Vec<PositionRecord>) -> (Vec<PositionRecord>, PreprocessStats) {
        let mut stats = PreprocessStats { input: records.len(), ..Default::default() };

        let mut pts: Vec<PositionRecord> = Vec::with_capacity(records.len());
        for r in records {
            if !r.pos.lat.is_finite() || !r.pos.lon.is_finite() || !r.pos.in_valid_range() || r.pos.is_null_island() {
                stats.invalid += 1;
            } else if !self.config.bbox.contains(r.pos) {
                stats.out_of_bbox += 1;
            } else {
                pts.push(r);
            }
        }
        if stats.invalid > 0 || stats.out_of_bbox > 0 {
            debug!("dropped {} invalid and {} out-of-bbox fixes", stats.invalid, stats.out_of_bbox);
        }

        pts.sort_by_key(|r| (r.timestamp.is_none(), r.timestamp));

        let before = pts.len();
        let pts = self.speed_filter(pts);
        stats.speed_outliers = before - pts.len();

        let before = pts.len();
        let pts = exact_dedup(pts);
        stats.exact_duplicates = before - pts.len();

        let before = pts.len();
        let pts = self.near_dedup(pts);
        stats.near_duplicates = before - pts.len();

        let before = pts.len();
        let pts = self.density_filter(pts);
        stats.sparse = before - pts.len();

        stats.output = pts.len();
        debug!(
            "speed {} / exact dup {} / near dup {} / sparse {}",
            stats.speed_outliers, stats.exact_duplicates, stats.near_duplicates, stats.sparse
        );
        info!("preprocess: {} of {} fixes kept", stats.output, stats.input);
        (pts, stats)
    }

    // ── 4. speed ──────────────────────────────────────────────────────────

    /// Input must be chronologically sorted.  Each trip keeps its own anchor:
    /// the last accepted timed fix.
    fn speed_filter(&self, pts: Vec<PositionRecord>) -> Vec<PositionRecord> {
        let max_mps = self.config.max_speed_mps();
        let gap = self.config.trip_gap_secs();
        let mut anchors: FxHashMap<TripId, (GeoPoint, i64)> = FxHashMap::default();

        pts.into_iter()
            .filter(|r| {
                let Some(ts) = r.timestamp else {
                    return true;
                };
                let Some(&(pos, anchor_ts)) = anchors.get(&r.trip_id) else {
                    anchors.insert(r.trip_id, (r.pos, ts));
                    return true;
                };
                let dt = ts - anchor_ts;
                if dt <= 0 {
                    return true;
                }
                if dt > gap || pos.distance_m(r.pos) / dt as f64 <= max_mps {
                    anchors.insert(r.trip_id, (r.pos, ts));
                    true
                } else {
                    false
                }
            })
            .collect()
    }

    // ── 6. near duplicates ────────────────────────────────────────────────

    /// Grid hash with cells at least `threshold` wide everywhere inside the
    /// bbox, so a fix only needs checking against its own and the eight
    /// neighbouring cells.
    fn near_dedup(&self, pts: Vec<PositionRecord>) -> Vec<PositionRecord> {
        let threshold = self.config.near_duplicate_threshold_m;
        let b = &self.config.bbox;
        let poleward = b.min_lat.abs().max(b.max_lat.abs()).min(89.0).to_radians();
        let d_lat = threshold / METRES_PER_DEGREE;
        let d_lon = threshold / (METRES_PER_DEGREE * poleward.cos());
        let cell = |p: GeoPoint| ((p.lat / d_lat).floor() as i64, (p.lon / d_lon).floor() as i64);

        let mut grid: FxHashMap<(i64, i64), Vec<GeoPoint>> = FxHashMap::default();
        pts.into_iter()
            .filter(|r| {
                let (ci, cj) = cell(r.pos);
                let close = (ci - 1..=ci + 1)
                    .flat_map(|i| (cj - 1..=cj + 1).map(move |j| (i, j)))
                    .filter_map(|c| grid.get(&c))
                    .flatten()
                    .any(|&kept| r.pos.approx_distance_m(kept) < threshold);
                if close {
                    return false;
                }
                grid.entry((ci, cj)).or_default().push(r.pos);
                true
            })
            .collect()
    }

    // ── 7. density ────────────────────────────────────────────────────────

    fn density_filter(&self, pts: Vec<PositionRecord>) -> Vec<PositionRecord> {
        if pts.is_empty() {
            return pts;
        }
        let radius = self.config.outlier_radius_m;
        let need = self.config.outlier_min_neighbors;

        let tree = RTree::bulk_load(
            pts.iter()
                .enumerate()
                .map(|(i, r)| GeomWithData::new(r.pos.as_array(), i))
                .collect(),
        );
        let dense = |i: usize, p: GeoPoint| -> bool {
            let (lo, hi) = p.degree_envelope(radius);
            tree.locate_in_envelope(&AABB::from_corners(lo, hi))
                .filter(|e| e.data != i)
                .filter(|e| p.approx_distance_m(GeoPoint::new(e.geom()[0], e.geom()[1])) <= radius)
                .take(need)
                .count()
                >= need
        };

        #[cfg(not(feature = "parallel"))]
        let keep: Vec<bool> = pts.iter().enumerate().map(|(i, r)| dense(i, r.pos)).collect();

        #[cfg(feature = "parallel")]
        let keep: Vec<bool> = {
            use rayon::prelude::*;
            pts.par_iter().enumerate().map(|(i, r)| dense(i, r.pos)).collect()
        };

        pts.into_iter()
            .zip(keep)
            .filter_map(|(r, k)| k.then_some(r))
            .collect()
    }
}

// ── 5. exact duplicates ───────────────────────────────────────────────────────

fn exact_dedup(pts: Vec<PositionRecord>) -> Vec<PositionRecord> {
    let mut seen = FxHashSet::default();
    pts.into_iter().filter(|r| seen.insert(r.fix_key())).collect()
}
