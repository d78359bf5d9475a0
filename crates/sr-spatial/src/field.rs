//! Point risk estimates for lattice graphs.
//!
//! A lattice node is not an ingested location, so it has no feature row of
//! its own.  Its risk comes from a [`RiskField`] evaluated at the node's
//! coordinates; edges then use the same endpoint-mean policy as every other
//! graph.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use sr_core::{GeoPoint, Location};

use crate::{SpatialError, SpatialResult};

/// Risk in `[0, 1]` at an arbitrary coordinate.
pub trait RiskField {
    fn risk_at(&self, pos: GeoPoint) -> f64;
}

impl<F> RiskField for F
where
    F: Fn(GeoPoint) -> f64,
{
    fn risk_at(&self, pos: GeoPoint) -> f64 {
        self(pos)
    }
}

// ── IdwField ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct ScoredPoint {
    point: [f64; 2],
    pos: GeoPoint,
    risk: f64,
}

impl RTreeObject for ScoredPoint {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for ScoredPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

/// Inverse-distance-weighted interpolation over the `k` nearest scored
/// locations (weight `1 / d²`, planar metres).  A query that coincides with
/// a scored location returns that location's score exactly.
pub struct IdwField {
    tree: RTree<ScoredPoint>,
    k: usize,
}

impl IdwField {
    /// Default neighbourhood size.
    pub const DEFAULT_K: usize = 4;

    /// Index `locations` with their parallel `scores`.
    pub fn new(locations: &[Location], scores: &[f64], k: usize) -> SpatialResult<Self> {
        if locations.len() != scores.len() {
            return Err(SpatialError::LengthMismatch {
                locations: locations.len(),
                scores: scores.len(),
            });
        }
        let mut entries = Vec::with_capacity(locations.len());
        for (loc, &risk) in locations.iter().zip(scores) {
            if !loc.pos.is_finite() || !risk.is_finite() {
                return Err(SpatialError::NonFinite(loc.id));
            }
            entries.push(ScoredPoint {
                point: [loc.pos.lat, loc.pos.lon],
                pos: loc.pos,
                risk: risk.clamp(0.0, 1.0),
            });
        }
        Ok(Self { tree: RTree::bulk_load(entries), k: k.max(1) })
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl RiskField for IdwField {
    /// 0 when the field holds no locations.
    fn risk_at(&self, pos: GeoPoint) -> f64 {
        let mut num = 0.0;
        let mut den = 0.0;
        for p in self.tree.nearest_neighbor_iter(&[pos.lat, pos.lon]).take(self.k) {
            let d = p.pos.planar_distance_m(pos);
            if d < 1e-6 {
                return p.risk;
            }
            let w = 1.0 / (d * d);
            num += w * p.risk;
            den += w;
        }
        if den > 0.0 { (num / den).clamp(0.0, 1.0) } else { 0.0 }
    }
}
