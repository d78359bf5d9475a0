//! CSV loaders for locations and incidents.
//!
//! # Locations
//!
//! ```csv
//! location_id,latitude,longitude,lighting_score
//! 0,40.7128,-74.0060,0.8
//! 1,40.7140,-74.0051,
//! ```
//!
//! An empty `lighting_score` defaults to 0.5; out-of-range values are
//! clamped into `[0, 1]`.
//!
//! # Incidents
//!
//! ```csv
//! location_id,hour,severity
//! 0,22,high
//! 1,8,low
//! ```
//!
//! `severity` is a label (`low`, `medium`, `high`) or a casualty count.
//! Collision exports may instead carry `injuries` and `fatalities` columns;
//! both numeric forms go through [`Severity::from_casualties`].
//!
//! ```csv
//! location_id,hour,injuries,fatalities
//! 0,17,1,0
//! 2,23,0,1
//! ```

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use sr_core::{IncidentRecord, Location, LocationId, Severity};

const DEFAULT_LIGHTING: f64 = 0.5;

#[derive(Deserialize)]
struct LocationRow {
    location_id:    u32,
    latitude:       f64,
    longitude:      f64,
    lighting_score: Option<f64>,
}

#[derive(Deserialize)]
struct IncidentRow {
    location_id: u32,
    hour:        u8,
    #[serde(default)]
    severity:    Option<String>,
    #[serde(default)]
    injuries:    Option<u32>,
    #[serde(default)]
    fatalities:  Option<u32>,
}

impl IncidentRow {
    fn severity(&self) -> Result<Severity> {
        match self.severity.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => match s.parse::<u32>() {
                Ok(casualties) => Ok(Severity::from_casualties(casualties, 0)),
                Err(_) => Ok(s.parse()?),
            },
            None if self.injuries.is_some() || self.fatalities.is_some() => Ok(
                Severity::from_casualties(self.injuries.unwrap_or(0), self.fatalities.unwrap_or(0)),
            ),
            None => bail!("incident at location {} has no severity", self.location_id),
        }
    }
}

pub fn load_locations_csv(path: &Path) -> Result<Vec<Location>> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let locations =
        load_locations_reader(file).with_context(|| format!("reading {}", path.display()))?;
    log::info!("loaded {} locations from {}", locations.len(), path.display());
    Ok(locations)
}

pub fn load_locations_reader<R: Read>(reader: R) -> Result<Vec<Location>> {
    let mut out = Vec::new();
    for (line, row) in csv::Reader::from_reader(reader).deserialize::<LocationRow>().enumerate() {
        let row = row.with_context(|| format!("location row {}", line + 1))?;
        if !(row.latitude.is_finite() && row.longitude.is_finite()) {
            bail!("location {} has a non-finite coordinate", row.location_id);
        }
        out.push(Location::new(
            LocationId(row.location_id),
            row.latitude,
            row.longitude,
            row.lighting_score.unwrap_or(DEFAULT_LIGHTING),
        ));
    }
    Ok(out)
}

pub fn load_incidents_csv(path: &Path) -> Result<Vec<IncidentRecord>> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let incidents =
        load_incidents_reader(file).with_context(|| format!("reading {}", path.display()))?;
    log::info!("loaded {} incidents from {}", incidents.len(), path.display());
    Ok(incidents)
}

pub fn load_incidents_reader<R: Read>(reader: R) -> Result<Vec<IncidentRecord>> {
    let mut out = Vec::new();
    for (line, row) in csv::Reader::from_reader(reader).deserialize::<IncidentRow>().enumerate() {
        let row = row.with_context(|| format!("incident row {}", line + 1))?;
        if row.hour > 23 {
            bail!("incident row {}: hour {} is outside 0..=23", line + 1, row.hour);
        }
        let severity = row.severity().with_context(|| format!("incident row {}", line + 1))?;
        out.push(IncidentRecord::new(LocationId(row.location_id), row.hour, severity));
    }
    Ok(out)
}
