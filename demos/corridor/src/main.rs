//! corridor — end-to-end demo for the rust_roadgraph workspace.
//!
//! Simulates noisy GPS traces of vehicles driving two crossing roads in
//! Bratislava, builds the road graph in two batches (cold start, then an
//! incremental update), matches it against a stub road engine, places
//! charging stations with both strategies, and writes everything to CSV.
//!
//! Set `RUST_LOG=debug` for per-stage detail.

mod roads;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use log::info;

use rg_build::PipelineBuilder;
use rg_core::{GeoPoint, PipelineConfig, SeedRng, TripId};
use rg_output::{CsvGraphWriter, GraphWriter, load_graph_csv};
use rg_place::{KCenter, KDominatingSet, PlacementParams, PlacementStrategy};
use rg_prep::PositionRecord;

use roads::CorridorRoads;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:             u64   = 42;
const START_UNIX_SECS:  i64   = 1_700_000_000;
const SAMPLE_SPACING_M: f64   = 15.0;
const SAMPLE_PERIOD_S:  i64   = 1;
const GPS_NOISE_M:      f64   = 4.0;
const STATIONS:         usize = 4;
const COVER_HOPS:       usize = 8;
const OUTPUT_DIR:       &str  = "output/corridor";

// ── Synthetic traces ──────────────────────────────────────────────────────────

/// One vehicle driving from `from` to `to` (metres `(north, east)` from
/// `origin`), sampled every `SAMPLE_SPACING_M` with GPS noise.
fn drive(
    origin: GeoPoint,
    from: (f64, f64),
    to: (f64, f64),
    trip: u32,
    start_ts: i64,
    rng: &mut SeedRng,
) -> Vec<PositionRecord> {
    let (dn, de) = (to.0 - from.0, to.1 - from.1);
    let len = (dn * dn + de * de).sqrt();
    let steps = (len / SAMPLE_SPACING_M) as i64;
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let p = origin.offset_m(
                from.0 + t * dn + rng.gen_range(-GPS_NOISE_M..GPS_NOISE_M),
                from.1 + t * de + rng.gen_range(-GPS_NOISE_M..GPS_NOISE_M),
            );
            PositionRecord::new(p.lat, p.lon, Some(start_ts + i * SAMPLE_PERIOD_S), TripId(trip))
        })
        .collect()
}

fn first_batch(origin: GeoPoint, rng: &mut SeedRng) -> Vec<PositionRecord> {
    let mut fixes = Vec::new();
    fixes.extend(drive(origin, (0.0, -1_400.0), (0.0, 1_400.0), 1, START_UNIX_SECS, rng));
    fixes.extend(drive(origin, (0.0, 1_400.0), (0.0, -1_400.0), 2, START_UNIX_SECS + 600, rng));
    fixes.extend(drive(origin, (-900.0, 0.0), (900.0, 0.0), 3, START_UNIX_SECS + 1_200, rng));
    // A parked phone producing junk far outside the operating region.
    fixes.push(PositionRecord::new(0.0, 0.0, Some(START_UNIX_SECS + 5), TripId(9)));
    fixes.push(PositionRecord::new(52.52, 13.40, Some(START_UNIX_SECS + 6), TripId(9)));
    fixes
}

fn second_batch(origin: GeoPoint, rng: &mut SeedRng) -> Vec<PositionRecord> {
    let later = START_UNIX_SECS + 86_400;
    let mut fixes = drive(origin, (900.0, 0.0), (-900.0, 0.0), 4, later, rng);
    fixes.extend(drive(origin, (0.0, -1_400.0), (0.0, 0.0), 5, later + 600, rng));
    fixes
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let origin = GeoPoint::new(48.1575, 17.1300);
    let mut rng = SeedRng::new(SEED);

    println!("=== corridor — rust_roadgraph ===");
    println!("Seed: {SEED}  |  noise: ±{GPS_NOISE_M} m  |  spacing: {SAMPLE_SPACING_M} m");
    println!();

    // 1. Pipeline with the stub road engine.
    let pipeline = PipelineBuilder::new(PipelineConfig::default())
        .matcher(CorridorRoads::new(origin))
        .build()?;

    // 2. Cold start.
    let t0 = Instant::now();
    let (graph, report) = pipeline.run(None, first_batch(origin, &mut rng))?;
    println!("Cold build: {} nodes, {} edges", graph.node_count(), graph.edge_count());
    println!("{}", serde_json::to_string_pretty(&report)?);

    // 3. Incremental update on the existing graph.
    let (graph, report) = pipeline.run(Some(graph), second_batch(origin, &mut rng))?;
    println!("Warm update: {} nodes, {} edges", graph.node_count(), graph.edge_count());
    println!("{}", serde_json::to_string_pretty(&report)?);
    info!("graph built in {:.3} s", t0.elapsed().as_secs_f64());

    // 4. Placement.
    let mut kcenter = KCenter;
    let centers = kcenter.place(&graph, &PlacementParams::new(STATIONS))?;
    println!();
    println!("k-center, k = {STATIONS}: covering radius {:.0} m", centers.objective);

    let mut kdom = KDominatingSet::new(rng.child(1));
    let cover = kdom.place(&graph, &PlacementParams::new(COVER_HOPS))?;
    println!("k-dominating set, {COVER_HOPS} hops: {} stations", cover.objective);

    println!();
    println!("{:<6} {:<12} {:<12} {:<20}", "Rank", "Lat", "Lon", "Road");
    println!("{}", "-".repeat(52));
    for (rank, id) in centers.selected.iter().enumerate() {
        let Some(node) = graph.node(*id) else {
            continue;
        };
        println!(
            "{:<6} {:<12.6} {:<12.6} {:<20}",
            rank,
            node.pos().lat,
            node.pos().lon,
            node.road.name.as_deref().unwrap_or("(off-road)"),
        );
    }

    // 5. Export, then reload to check the files.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let mut writer = CsvGraphWriter::new(Path::new(OUTPUT_DIR))?;
    writer.write_graph(&graph)?;
    writer.write_placement(kcenter.name(), &centers, &graph)?;
    writer.write_placement(kdom.name(), &cover, &graph)?;
    writer.finish()?;

    let reloaded = load_graph_csv(Path::new(OUTPUT_DIR))?;
    println!();
    println!(
        "Wrote {OUTPUT_DIR}/{{nodes,edges,placement}}.csv ({} nodes, {} edges reloaded)",
        reloaded.node_count(),
        reloaded.edge_count()
    );

    Ok(())
}
