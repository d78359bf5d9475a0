//! Per-location feature aggregation.
//!
//! Features depend on the query hour through `recent_incidents`, so a table
//! is rebuilt whenever the hour changes.  Counts are stored as `f64` because
//! they feed straight into standardisation.

use rustc_hash::FxHashMap;

use sr_core::{IncidentRecord, Location, LocationId};

/// Number of model input columns.
pub const N_FEATURES: usize = 4;

/// One standardisable feature vector:
/// `[lighting, total_incidents, high_severity, recent_incidents]`.
pub type FeatureRow = [f64; N_FEATURES];

/// Column index of `lighting` within a [`FeatureRow`].
pub(crate) const LIGHTING_COL: usize = 0;

/// Column index of `total_incidents` within a [`FeatureRow`].
pub(crate) const TOTAL_INCIDENTS_COL: usize = 1;

/// Aggregated model inputs for one location.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationFeatures {
    pub location: LocationId,
    /// Lighting quality in `[0, 1]`.
    pub lighting: f64,
    pub total_incidents: f64,
    pub high_severity: f64,
    /// Incidents whose hour lies within the window around the query hour.
    pub recent_incidents: f64,
}

impl LocationFeatures {
    /// Build from possibly-missing counts.  Missing or non-finite counts
    /// become 0, and lighting is clamped into `[0, 1]`.
    pub fn from_partial(
        location: LocationId,
        lighting: f64,
        total_incidents: Option<f64>,
        high_severity: Option<f64>,
        recent_incidents: Option<f64>,
    ) -> Self {
        let count = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0).max(0.0);
        Self {
            location,
            lighting: if lighting.is_finite() { lighting.clamp(0.0, 1.0) } else { 0.0 },
            total_incidents: count(total_incidents),
            high_severity: count(high_severity),
            recent_incidents: count(recent_incidents),
        }
    }

    /// Model input row.  Non-finite values are replaced by 0.
    #[inline]
    pub fn row(&self) -> FeatureRow {
        let clean = |v: f64| if v.is_finite() { v } else { 0.0 };
        [
            clean(self.lighting),
            clean(self.total_incidents),
            clean(self.high_severity),
            clean(self.recent_incidents),
        ]
    }
}

#[derive(Default)]
struct Counts {
    total: u32,
    high: u32,
    recent: u32,
}

/// Aggregate incidents into one [`LocationFeatures`] per location, in the
/// same order as `locations`.
///
/// An incident is "recent" when `query_hour - window <= hour <= query_hour +
/// window` (plain integer window, no wrap-around midnight).  Incidents that
/// reference an unknown location are ignored.
pub fn aggregate_features(
    locations: &[Location],
    incidents: &[IncidentRecord],
    query_hour: u8,
    window: u8,
) -> Vec<LocationFeatures> {
    let lo = i32::from(query_hour) - i32::from(window);
    let hi = i32::from(query_hour) + i32::from(window);

    let mut counts: FxHashMap<LocationId, Counts> = FxHashMap::default();
    counts.reserve(locations.len());
    for loc in locations {
        counts.entry(loc.id).or_default();
    }

    let mut orphaned = 0usize;
    for inc in incidents {
        let Some(c) = counts.get_mut(&inc.location) else {
            orphaned += 1;
            continue;
        };
        c.total += 1;
        if inc.severity.is_high() {
            c.high += 1;
        }
        if (lo..=hi).contains(&i32::from(inc.hour)) {
            c.recent += 1;
        }
    }
    if orphaned > 0 {
        log::debug!("ignored {orphaned} incidents referencing unknown locations");
    }

    locations
        .iter()
        .map(|loc| {
            let c = &counts[&loc.id];
            LocationFeatures {
                location: loc.id,
                lighting: loc.lighting,
                total_incidents: f64::from(c.total),
                high_severity: f64::from(c.high),
                recent_incidents: f64::from(c.recent),
            }
        })
        .collect()
}
