//! walk: plan safest and shortest walking routes over a risk-scored city.
//!
//! Without input files the demo generates a synthetic city around lower
//! Manhattan.  With `--locations` and `--incidents` it loads CSVs instead
//! (see `load.rs` for the formats).
//!
//! ```text
//! walk [--config route.json] [--locations l.csv --incidents i.csv]
//!      [--sample N] [--hour H] [--lattice RxC] [--json]
//! ```
//!
//! Set `RUST_LOG=info` to see pipeline timings.

mod load;
mod sample;


use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use sr_core::{LocationId, RouteConfig};
use sr_planner::{Planner, PlannerBuilder, RoutePlan, Topology};
use sr_risk::RiskCategory;
use sr_spatial::{LatticeSpec, RouteStats};

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_SAMPLE_LOCATIONS: usize = 200;
const NIGHT_HOUR:               u8    = 22;

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "walk", about = "Safest and shortest walking routes over a risk-scored city")]
struct Args {
    /// JSON file with `RouteConfig` overrides.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Location CSV (`location_id,latitude,longitude,lighting_score`).
    #[arg(long, requires = "incidents")]
    locations: Option<PathBuf>,
    /// Incident CSV (`location_id,hour,severity`).
    #[arg(long, requires = "locations")]
    incidents: Option<PathBuf>,
    /// Number of synthetic locations when no CSVs are given.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_LOCATIONS)]
    sample: usize,
    /// Query hour (0-23); overrides the config file.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=23))]
    hour: Option<u8>,
    /// Route on a `RxC` grid instead of the location graph.
    #[arg(long, value_parser = parse_lattice)]
    lattice: Option<LatticeSpec>,
    /// Print the safest route as JSON.
    #[arg(long)]
    json: bool,
}

/// `"40x30"` → 40 rows, 30 columns.
fn parse_lattice(s: &str) -> Result<LatticeSpec, String> {
    let (rows, cols) = s.split_once(['x', 'X']).ok_or_else(|| format!("expected RxC, got {s:?}"))?;
    let dim = |v: &str| v.trim().parse::<usize>().map_err(|e| format!("{v:?}: {e}"));
    Ok(LatticeSpec { rows: dim(rows)?, cols: dim(cols)? })
}

fn load_config(args: &Args) -> Result<RouteConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader(file).with_context(|| format!("parsing {}", path.display()))?
        }
        None => RouteConfig::default(),
    };
    if let Some(hour) = args.hour {
        config.query_hour = hour;
    }
    config.validate()?;
    Ok(config)
}

// ── Endpoint choice ───────────────────────────────────────────────────────────

/// Two far-apart nodes (south-west-most and north-east-most) of the largest
/// connected component.
fn pick_endpoints(planner: &Planner) -> Option<(LocationId, LocationId)> {
    let g = planner.graph();
    let labels = &g.components();
    let n_comp = labels.iter().copied().max()? as usize + 1;
    let mut sizes = vec![0usize; n_comp];
    for &c in labels {
        sizes[c as usize] += 1;
    }
    let largest = (0..n_comp).max_by_key(|&c| (sizes[c], std::cmp::Reverse(c)))? as u32;

    let members = || (0..g.node_count()).filter(move |&i| labels[i] == largest);
    let diag = |i: &usize| g.node_pos[*i].lat + g.node_pos[*i].lon;
    let sw = members().min_by(|a, b| diag(a).total_cmp(&diag(b)))?;
    let ne = members().max_by(|a, b| diag(a).total_cmp(&diag(b)))?;
    Some((g.node_location[sw], g.node_location[ne]))
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_stats(label: &str, stats: &RouteStats) {
    println!(
        "  {label:<9} {:>9.1} m  {:>3} segments  avg risk {:.3} ({})",
        stats.total_distance_m,
        stats.num_segments,
        stats.avg_risk,
        RiskCategory::from_score(stats.avg_risk)
    );
}

fn print_plan(plan: &RoutePlan) {
    let Some(cmp) = plan.comparison else {
        println!("  no route from {} to {}", plan.start, plan.end);
        return;
    };
    print_stats("safest", &cmp.first);
    print_stats("shortest", &cmp.second);
    println!(
        "  safest route is {:+.1} m longer with {:+.3} avg risk",
        cmp.distance_difference_m, cmp.risk_difference
    );
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let args = Args::parse();
    let config = load_config(&args)?;

    let (locations, incidents) = match (&args.locations, &args.incidents) {
        (Some(l), Some(i)) => (load::load_locations_csv(l)?, load::load_incidents_csv(i)?),
        _ => sample::generate(args.sample, config.seed)?,
    };
    println!("=== walk — safe route planner ===");
    println!(
        "Locations: {}  |  Incidents: {}  |  Hour: {:02}:00  |  Seed: {}",
        locations.len(),
        incidents.len(),
        config.query_hour,
        config.seed
    );

    let topology = args.lattice.map_or(Topology::Pairwise, Topology::Lattice);
    let t0 = Instant::now();
    let mut planner = PlannerBuilder::new(config, locations)
        .incidents(incidents)
        .topology(topology)
        .build()?;
    println!("Model + graph built in {:.3} s", t0.elapsed().as_secs_f64());

    let [low, medium, high] = planner.risk_distribution();
    println!("Risk distribution: {low} low, {medium} medium, {high} high");

    let stats = planner.graph().stats();
    println!(
        "Graph: {} nodes, {} edges, avg degree {:.2}, connected: {}",
        stats.node_count, stats.edge_count, stats.avg_degree, stats.is_connected
    );
    println!();

    let Some((start, end)) = pick_endpoints(&planner) else {
        println!("Graph is empty; nothing to route.");
        return Ok(());
    };

    println!("Route {start} → {end} at {:02}:00", planner.config().query_hour);
    let plan = planner.plan(start, end)?;
    print_plan(&plan);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan.safest)?);
    }

    if planner.config().query_hour != NIGHT_HOUR {
        planner.set_query_hour(NIGHT_HOUR)?;
        println!();
        println!("Route {start} → {end} at {NIGHT_HOUR:02}:00");
        print_plan(&planner.plan(start, end)?);
    }

    Ok(())
}
