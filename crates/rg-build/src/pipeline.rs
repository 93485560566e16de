//! End-to-end orchestration: raw fixes in, road graph out.

use log::{debug, info, warn};

use rg_core::{GeoPoint, PipelineConfig};
use rg_prep::{
    HexGridDeduplicator, PositionRecord, PreprocessStats, Preprocessor, Trip, segment_trips,
};
use rg_spatial::SpatialGraph;

use crate::{
    BuildStats, GraphBuilder, MapMatchAdapter, MatchStats, NoopMatcher, PipelineResult,
    RoadMatcher,
};

/// What each stage of one run did.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineReport {
    pub preprocess:    PreprocessStats,
    pub trips:         usize,
    /// Trips replaced by the matcher's trajectory.
    pub matched_trips: usize,
    /// Points left after hex-grid thinning.
    pub hex_points:    usize,
    pub build:         Option<BuildStats>,
    pub matching:      Option<MatchStats>,
}

/// Fluent builder for [`Pipeline`].
///
/// ```rust,ignore
/// let pipeline = PipelineBuilder::new(config).matcher(engine).build()?;
/// let (graph, report) = pipeline.run(None, records)?;
/// ```
pub struct PipelineBuilder<M: RoadMatcher = NoopMatcher> {
    config:  PipelineConfig,
    matcher: Option<M>,
}

impl PipelineBuilder<NoopMatcher> {
    /// A pipeline without road matching until [`matcher`](Self::matcher)
    /// is called.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config, matcher: None }
    }
}

impl<M: RoadMatcher> PipelineBuilder<M> {
    /// Use `matcher` for trajectory matching and snapping.
    pub fn matcher<N: RoadMatcher>(self, matcher: N) -> PipelineBuilder<N> {
        PipelineBuilder { config: self.config, matcher: Some(matcher) }
    }

    /// Validate the configuration.  Every threshold problem surfaces here,
    /// never in the middle of a run.
    pub fn build(self) -> PipelineResult<Pipeline<M>> {
        self.config.validate()?;
        GraphBuilder::new(&self.config)?;
        let hex = HexGridDeduplicator::new(self.config.hex_dedup_resolution)?;
        Ok(Pipeline { config: self.config, matcher: self.matcher, hex })
    }
}

pub struct Pipeline<M: RoadMatcher = NoopMatcher> {
    config:  PipelineConfig,
    matcher: Option<M>,
    hex:     HexGridDeduplicator,
}

impl<M: RoadMatcher> Pipeline<M> {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one batch against `existing` (cold start when `None` or empty).
    ///
    /// Degenerate input (nothing given, nothing surviving preprocessing)
    /// returns the existing graph unchanged.
    pub fn run(
        &self,
        existing: Option<SpatialGraph>,
        records: Vec<PositionRecord>,
    ) -> PipelineResult<(SpatialGraph, PipelineReport)> {
        let mut graph = existing.unwrap_or_default();
        let mut report = PipelineReport::default();

        if records.is_empty() {
            info!("no input fixes, graph unchanged");
            return Ok((graph, report));
        }
        info!("pipeline start: {} fixes, graph has {} nodes", records.len(), graph.node_count());

        let (clean, stats) = Preprocessor::new(&self.config).run(records);
        report.preprocess = stats;
        if clean.is_empty() {
            info!("nothing survived preprocessing, graph unchanged");
            return Ok((graph, report));
        }

        let points = self.trajectories(&clean, &mut report);
        let thinned = self.hex.dedup(&points);
        report.hex_points = thinned.len();
        debug!("hex grid: {} -> {} points", points.len(), thinned.len());

        let builder = GraphBuilder::new(&self.config)?;
        report.build = Some(builder.build(&mut graph, &thinned));

        if let Some(matcher) = &self.matcher {
            report.matching = Some(MapMatchAdapter::new(matcher, &self.config).apply(&mut graph));
        }

        info!("pipeline done: {} nodes, {} edges", graph.node_count(), graph.edge_count());
        Ok((graph, report))
    }

    /// Replace each trip by its matched trajectory where the matcher can
    /// provide one.  Fixes outside any trip pass through unchanged.
    fn trajectories(&self, clean: &[PositionRecord], report: &mut PipelineReport) -> Vec<PositionRecord> {
        let segmented = segment_trips(clean, &self.config);
        report.trips = segmented.trips.len();

        let mut out = Vec::with_capacity(clean.len());
        for trip in segmented.trips {
            match self.match_trip(&trip) {
                Some(matched) => {
                    report.matched_trips += 1;
                    out.extend(matched);
                }
                None => out.extend(trip.points),
            }
        }
        out.extend(segmented.leftovers);
        out
    }

    fn match_trip(&self, trip: &Trip) -> Option<Vec<PositionRecord>> {
        let matcher = self.matcher.as_ref()?;
        let raw: Vec<GeoPoint> = trip.points.iter().map(|r| r.pos).collect();
        let matched = match matcher.match_trajectory(&raw) {
            Some(m) if m.len() >= 2 => m,
            _ => {
                debug!("trip {} not matched, using {} raw fixes", trip.trip_id, raw.len());
                return None;
            }
        };
        // NaN and out-of-range coordinates fail `in_valid_range`.
        if let Some(bad) = matched.iter().find(|p| !p.in_valid_range() || p.is_null_island()) {
            warn!("matcher returned invalid point {bad:?} for trip {}, using raw fixes", trip.trip_id);
            return None;
        }

        // Timestamps only carry over when the matcher kept the fixes 1:1.
        let same_len = matched.len() == trip.points.len();
        Some(
            matched
                .into_iter()
                .enumerate()
                .map(|(i, p)| {
                    let ts = if same_len { trip.points[i].timestamp } else { None };
                    PositionRecord::new(p.lat, p.lon, ts, trip.trip_id)
                })
                .collect(),
        )
    }
}
