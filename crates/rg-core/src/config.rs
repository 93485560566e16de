//! Pipeline configuration snapshot.
//!
//! One `PipelineConfig` is supplied per run by the caller (typically loaded
//! from a database row or a TOML/JSON file by the application crate).  The
//! core never reads configuration from the environment or disk itself, and
//! never mutates a config mid-run.

use crate::{BoundingBox, CoreError, CoreResult};

/// Every numeric threshold used by one pipeline run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    // ── Preprocessing ─────────────────────────────────────────────────────
    /// Operating region; points outside are dropped.
    pub bbox: BoundingBox,

    /// Points closer than this to an already-kept point are near-duplicates.
    pub near_duplicate_threshold_m: f64,

    /// A point needs at least this many other points within
    /// `outlier_radius_m` to survive density filtering.
    pub outlier_min_neighbors: usize,

    pub outlier_radius_m: f64,

    /// Implied speeds above this are GPS jumps.
    pub max_speed_kmh: f64,

    /// A time gap longer than this starts a new trip.
    pub trip_gap_minutes: u32,

    /// Consecutive legs turning by more than this split a trip (reversals).
    pub max_bearing_diff_deg: f64,

    // ── Hex grid ──────────────────────────────────────────────────────────
    /// H3 resolution (0–15) used to bound point density before construction.
    /// At 13 a cell is narrower than 10 m, so fixes 10 m apart stay distinct.
    pub hex_dedup_resolution: u8,

    /// Coarser H3 resolution stored on nodes as partition metadata.
    pub hex_cluster_resolution: u8,

    // ── Graph construction ────────────────────────────────────────────────
    pub max_edge_length_m: f64,

    /// A new point within this distance of a node is merged into it.
    pub merge_threshold_m: f64,

    /// Neighbours connected to each incrementally inserted node.
    pub knn_k: usize,

    // ── Map matching ──────────────────────────────────────────────────────
    /// Snaps farther than this from the raw position are rejected.
    pub max_snap_distance_m: f64,

    /// Drop nodes that remain off-road after matching.
    pub remove_off_road_nodes: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bbox:                        BoundingBox::new(47.5, 49.7, 16.8, 22.6),
            near_duplicate_threshold_m:  5.0,
            outlier_min_neighbors:       1,
            outlier_radius_m:            200.0,
            max_speed_kmh:               200.0,
            trip_gap_minutes:            30,
            max_bearing_diff_deg:        90.0,
            hex_dedup_resolution:        13,
            hex_cluster_resolution:      9,
            max_edge_length_m:           200.0,
            merge_threshold_m:           10.0,
            knn_k:                       2,
            max_snap_distance_m:         100.0,
            remove_off_road_nodes:       false,
        }
    }
}

impl PipelineConfig {
    /// Trip gap in seconds.
    #[inline]
    pub fn trip_gap_secs(&self) -> i64 {
        self.trip_gap_minutes as i64 * 60
    }

    /// Maximum plausible speed in metres per second.
    #[inline]
    pub fn max_speed_mps(&self) -> f64 {
        self.max_speed_kmh / 3.6
    }

    /// Reject configurations that would make a run meaningless.
    ///
    /// Called once when a pipeline is built; a bad threshold is fatal there
    /// rather than surfacing halfway through a run.
    pub fn validate(&self) -> CoreResult<()> {
        let b = &self.bbox;
        check(
            (-90.0..=90.0).contains(&b.min_lat) && (-90.0..=90.0).contains(&b.max_lat),
            "bbox latitudes must lie in [-90, 90]",
        )?;
        check(
            (-180.0..=180.0).contains(&b.min_lon) && (-180.0..=180.0).contains(&b.max_lon),
            "bbox longitudes must lie in [-180, 180]",
        )?;
        check(b.min_lat < b.max_lat && b.min_lon < b.max_lon, "bbox min must be below max")?;

        positive(self.near_duplicate_threshold_m, "near_duplicate_threshold_m")?;
        positive(self.outlier_radius_m, "outlier_radius_m")?;
        positive(self.max_speed_kmh, "max_speed_kmh")?;
        positive(self.max_edge_length_m, "max_edge_length_m")?;
        positive(self.merge_threshold_m, "merge_threshold_m")?;
        positive(self.max_snap_distance_m, "max_snap_distance_m")?;

        check(self.outlier_min_neighbors >= 1, "outlier_min_neighbors must be at least 1")?;
        check(self.trip_gap_minutes >= 1, "trip_gap_minutes must be at least 1")?;
        check(self.knn_k >= 1, "knn_k must be at least 1")?;
        check(
            self.max_bearing_diff_deg > 0.0 && self.max_bearing_diff_deg <= 180.0,
            "max_bearing_diff_deg must lie in (0, 180]",
        )?;
        check(self.hex_dedup_resolution <= 15, "hex_dedup_resolution must lie in 0..=15")?;
        check(self.hex_cluster_resolution <= 15, "hex_cluster_resolution must lie in 0..=15")?;
        Ok(())
    }
}

fn check(ok: bool, msg: &str) -> CoreResult<()> {
    if ok { Ok(()) } else { Err(CoreError::Config(msg.to_owned())) }
}

fn positive(value: f64, name: &str) -> CoreResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be a positive finite number, got {value}")))
    }
}
