//! Geographic coordinate type and city-scale distance.
//!
//! Distances use a planar approximation: degree deltas are converted to
//! metres with a fixed metres-per-degree constant, and the longitude delta is
//! scaled by the cosine of the mean latitude of the two points.  Over a
//! single city this stays within a fraction of a percent of the great-circle
//! distance; it is not valid across large latitude spans.

/// Metres per degree of latitude used by [`GeoPoint::planar_distance_m`].
pub const METRES_PER_DEG_LAT: f64 = 111_000.0;

/// A WGS-84 coordinate in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar distance in metres.  Symmetric: `a.planar_distance_m(b) ==
    /// b.planar_distance_m(a)`.
    pub fn planar_distance_m(self, other: GeoPoint) -> f64 {
        let mean_lat = ((self.lat + other.lat) * 0.5).to_radians();
        let dy = (other.lat - self.lat) * METRES_PER_DEG_LAT;
        let dx = (other.lon - self.lon) * METRES_PER_DEG_LAT * mean_lat.cos();
        dx.hypot(dy)
    }

    /// Squared distance in raw degree space.  Only meaningful for ranking
    /// candidates (nearest-node lookup), never as a physical length.
    #[inline]
    pub fn degree_distance_2(self, other: GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat * dlat + dlon * dlon
    }

    /// Midpoint in degree space.
    #[inline]
    pub fn midpoint(self, other: GeoPoint) -> GeoPoint {
        GeoPoint::new((self.lat + other.lat) * 0.5, (self.lon + other.lon) * 0.5)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── BBox ──────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in degree space.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl BBox {
    /// Smallest box containing every point, or `None` for an empty input.
    pub fn enclosing<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<BBox> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BBox { min: first, max: first };
        for p in iter {
            bbox.min.lat = bbox.min.lat.min(p.lat);
            bbox.min.lon = bbox.min.lon.min(p.lon);
            bbox.max.lat = bbox.max.lat.max(p.lat);
            bbox.max.lon = bbox.max.lon.max(p.lon);
        }
        Some(bbox)
    }

    /// Latitude extent in degrees.
    #[inline]
    pub fn height_deg(&self) -> f64 {
        self.max.lat - self.min.lat
    }

    /// Longitude extent in degrees.
    #[inline]
    pub fn width_deg(&self) -> f64 {
        self.max.lon - self.min.lon
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min.lat..=self.max.lat).contains(&p.lat)
            && (self.min.lon..=self.max.lon).contains(&p.lon)
    }
}
