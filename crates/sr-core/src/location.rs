//! Ingested inputs: locations and historical incidents.
//!
//! Both are plain values owned by the ingestion layer.  The core only ever
//! borrows them (`&[Location]`, `&[IncidentRecord]`).

use std::fmt;
use std::str::FromStr;

use crate::{GeoPoint, LocationId, SrError};

// ── Location ──────────────────────────────────────────────────────────────────

/// A candidate waypoint with its street-lighting quality.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub id: LocationId,
    pub pos: GeoPoint,
    /// Lighting quality in `[0, 1]`; 0 = dark, 1 = well lit.
    pub lighting: f64,
}

impl Location {
    /// Construct a location, clamping `lighting` into `[0, 1]`.
    pub fn new(id: LocationId, lat: f64, lon: f64, lighting: f64) -> Self {
        Self {
            id,
            pos: GeoPoint::new(lat, lon),
            lighting: if lighting.is_nan() { 0.0 } else { lighting.clamp(0.0, 1.0) },
        }
    }
}

// ── Severity ──────────────────────────────────────────────────────────────────

/// Ordered incident severity.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    /// Derive a severity class from collision casualty counts.
    ///
    /// Any fatality, or two or more injuries, is `High`; a single injury is
    /// `Medium`; no casualties is `Low`.
    pub fn from_casualties(injuries: u32, fatalities: u32) -> Self {
        match (injuries, fatalities) {
            (_, f) if f > 0 => Severity::High,
            (0, _) => Severity::Low,
            (1, _) => Severity::Medium,
            _ => Severity::High,
        }
    }

    #[inline]
    pub fn is_high(self) -> bool {
        self == Severity::High
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for Severity {
    type Err = SrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" | "med" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(SrError::Parse(format!(
                "invalid severity {other:?}: expected \"low\", \"medium\", or \"high\""
            ))),
        }
    }
}

// ── IncidentRecord ────────────────────────────────────────────────────────────

/// One historical incident attributed to a location.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncidentRecord {
    pub location: LocationId,
    /// Hour of day, `0..=23`.
    pub hour: u8,
    pub severity: Severity,
}

impl IncidentRecord {
    pub fn new(location: LocationId, hour: u8, severity: Severity) -> Self {
        Self { location, hour, severity }
    }
}
