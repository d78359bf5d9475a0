//! Synthetic city data for running the demo without input files.
//!
//! Locations are scattered uniformly within ±0.05° of lower Manhattan with
//! uniform lighting.  Three incidents per location on average, each at a
//! random location and hour, with severity low / medium / high drawn at
//! 50 / 30 / 20 %.

use anyhow::Result;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use sr_core::{GeoPoint, IncidentRecord, Location, LocationId, Severity};

pub const CENTER: GeoPoint = GeoPoint { lat: 40.7128, lon: -74.0060 };
const SPREAD_DEG: f64 = 0.05;
const INCIDENTS_PER_LOCATION: usize = 3;
const SEVERITY_WEIGHTS: [f64; 3] = [0.5, 0.3, 0.2];

pub fn generate(n_locations: usize, seed: u64) -> Result<(Vec<Location>, Vec<IncidentRecord>)> {
    let mut rng = SmallRng::seed_from_u64(seed);

    let locations: Vec<Location> = (0..n_locations)
        .map(|i| {
            Location::new(
                LocationId(i as u32),
                CENTER.lat + rng.gen_range(-SPREAD_DEG..SPREAD_DEG),
                CENTER.lon + rng.gen_range(-SPREAD_DEG..SPREAD_DEG),
                rng.gen_range(0.0..1.0),
            )
        })
        .collect();

    if n_locations == 0 {
        return Ok((locations, Vec::new()));
    }
    let severity = WeightedIndex::new(SEVERITY_WEIGHTS)?;
    let levels = [Severity::Low, Severity::Medium, Severity::High];
    let incidents = (0..n_locations * INCIDENTS_PER_LOCATION)
        .map(|_| {
            IncidentRecord::new(
                LocationId(rng.gen_range(0..n_locations as u32)),
                rng.gen_range(0..24),
                levels[severity.sample(&mut rng)],
            )
        })
        .collect();

    Ok((locations, incidents))
}
