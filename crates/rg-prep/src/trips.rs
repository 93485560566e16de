//! Splitting cleaned fixes into trips.
//!
//! A trip is a chronologically ordered run of fixes from one vehicle with no
//! long pause and no abrupt reversal.  Trips feed trajectory matching; fixes
//! that cannot form a trip of at least two points are handed back
//! separately so the caller can still use them as raw points.

use std::collections::BTreeMap;

use log::debug;

use rg_core::{PipelineConfig, TripId, angular_difference};

use crate::PositionRecord;

/// Legs shorter than this have no meaningful bearing and never split a trip.
const MIN_BEARING_LEG_M: f64 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    pub trip_id: TripId,
    /// At least two fixes, bearings filled from the second one on.
    pub points:  Vec<PositionRecord>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segmented {
    /// In trip-id order, then time order.
    pub trips:     Vec<Trip>,
    /// Fixes left in runs shorter than two points.
    pub leftovers: Vec<PositionRecord>,
}

/// Group by trip id, sort each group by time (untimed fixes last), and split
/// on gaps longer than `trip_gap_minutes` or turns sharper than
/// `max_bearing_diff_deg`.
pub fn segment_trips(records: &[PositionRecord], config: &PipelineConfig) -> Segmented {
    let mut groups: BTreeMap<TripId, Vec<PositionRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.trip_id).or_default().push(r.clone());
    }

    let mut out = Segmented::default();
    for (trip_id, mut pts) in groups {
        pts.sort_by_key(|r| (r.timestamp.is_none(), r.timestamp));

        for run in split_runs(pts, config) {
            if run.len() >= 2 {
                out.trips.push(Trip { trip_id, points: run });
            } else {
                out.leftovers.extend(run);
            }
        }
    }

    debug!("segmented into {} trips, {} leftover fixes", out.trips.len(), out.leftovers.len());
    out
}

fn split_runs(pts: Vec<PositionRecord>, config: &PipelineConfig) -> Vec<Vec<PositionRecord>> {
    let gap = config.trip_gap_secs();
    let mut runs: Vec<Vec<PositionRecord>> = Vec::new();
    let mut run: Vec<PositionRecord> = Vec::new();

    for mut p in pts {
        if let Some(prev) = run.last() {
            let long_pause = matches!((prev.timestamp, p.timestamp), (Some(a), Some(b)) if b - a > gap);

            let leg = prev.pos.bearing_deg(p.pos);
            let reversal = prev.pos.distance_m(p.pos) >= MIN_BEARING_LEG_M
                && prev
                    .bearing_deg
                    .is_some_and(|b| angular_difference(b, leg) > config.max_bearing_diff_deg);

            if long_pause || reversal {
                runs.push(std::mem::take(&mut run));
                p.bearing_deg = None;
            } else {
                p.bearing_deg = (prev.pos.distance_m(p.pos) >= MIN_BEARING_LEG_M)
                    .then_some(leg)
                    .or(prev.bearing_deg);
            }
        } else {
            p.bearing_deg = None;
        }
        run.push(p);
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}
