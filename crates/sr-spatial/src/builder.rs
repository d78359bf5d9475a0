//! High-level graph construction.
//!
//! Two topologies, one edge policy:
//!
//! - **Pairwise**: every location is a node; every pair closer than
//!   `max_connection_distance_m` is an edge.  Candidates come from an R-tree
//!   envelope query instead of an all-pairs scan, and each node's candidates
//!   are computed independently on the rayon pool.  The per-node results are
//!   merged into a single [`RiskGraph`] before anyone can query it.
//! - **Lattice**: a regular `rows × cols` grid over a bounding box, each
//!   point connected to its 8 neighbours.  Node risk comes from a
//!   [`RiskField`].
//!
//! Both honour the distance ceiling: no edge is longer than
//! `max_connection_distance_m`.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use rstar::{RTree, AABB};

use sr_core::geo::METRES_PER_DEG_LAT;
use sr_core::{BBox, GeoPoint, Location, LocationId, NodeId, RouteConfig, SrError};

use crate::network::NodeEntry;
use crate::{RiskField, RiskGraph, RiskGraphBuilder, SpatialError, SpatialResult};

/// Highest latitude used when widening a longitude search window.
const MAX_ABS_LAT_DEG: f64 = 89.9;

/// Lattice resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeSpec {
    pub rows: usize,
    pub cols: usize,
}

/// Builds [`RiskGraph`]s under a distance ceiling and an optional deadline.
#[derive(Clone, Debug)]
pub struct GraphBuilder {
    max_connection_distance_m: f64,
    deadline: Option<Duration>,
}

impl GraphBuilder {
    pub fn new(max_connection_distance_m: f64) -> SpatialResult<Self> {
        if !(max_connection_distance_m.is_finite() && max_connection_distance_m > 0.0) {
            return Err(SrError::Config(format!(
                "max_connection_distance_m must be positive and finite, got {max_connection_distance_m}"
            ))
            .into());
        }
        Ok(Self { max_connection_distance_m, deadline: None })
    }

    pub fn from_config(config: &RouteConfig) -> SpatialResult<Self> {
        Ok(Self::new(config.max_connection_distance_m)?.with_deadline(config.build_deadline()))
    }

    /// Abort construction with [`SpatialError::DeadlineExceeded`] once
    /// `deadline` has elapsed.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn max_connection_distance_m(&self) -> f64 {
        self.max_connection_distance_m
    }

    fn check_deadline(&self, started: Instant, stage: &'static str) -> SpatialResult<()> {
        match self.deadline {
            Some(budget) if started.elapsed() >= budget => {
                Err(SpatialError::DeadlineExceeded { stage, elapsed: started.elapsed() })
            }
            _ => Ok(()),
        }
    }

    // ── Pairwise ──────────────────────────────────────────────────────────

    /// Proximity graph over `locations`, with `scores[i]` the risk of
    /// `locations[i]`.
    pub fn pairwise(&self, locations: &[Location], scores: &[f64]) -> SpatialResult<RiskGraph> {
        if locations.len() != scores.len() {
            return Err(SpatialError::LengthMismatch {
                locations: locations.len(),
                scores: scores.len(),
            });
        }
        let started = Instant::now();

        let mut b = RiskGraphBuilder::with_capacity(locations.len(), locations.len() * 4);
        for (loc, &risk) in locations.iter().zip(scores) {
            b.add_node(loc.id, loc.pos, risk)?;
        }

        let entries: Vec<NodeEntry> = locations
            .iter()
            .enumerate()
            .map(|(i, l)| NodeEntry { point: [l.pos.lat, l.pos.lon], id: NodeId(i as u32) })
            .collect();
        let tree = RTree::bulk_load(entries);
        let max_d = self.max_connection_distance_m;
        let dlat = max_d / METRES_PER_DEG_LAT;

        let per_node: Vec<Vec<NodeId>> = (0..locations.len())
            .into_par_iter()
            .map(|i| {
                self.check_deadline(started, "pairwise edge construction")?;
                let p = locations[i].pos;
                // Any partner within max_d has |Δlat| ≤ dlat, and the pair's
                // mean latitude is no further from the equator than this.
                let widest = (p.lat.abs() + dlat).min(MAX_ABS_LAT_DEG).to_radians();
                let dlon = max_d / (METRES_PER_DEG_LAT * widest.cos());
                let envelope =
                    AABB::from_corners([p.lat - dlat, p.lon - dlon], [p.lat + dlat, p.lon + dlon]);

                let mut near: Vec<NodeId> = tree
                    .locate_in_envelope(&envelope)
                    .filter(|e| e.id.index() > i)
                    .filter(|e| p.planar_distance_m(locations[e.id.index()].pos) <= max_d)
                    .map(|e| e.id)
                    .collect();
                near.sort_unstable();
                Ok(near)
            })
            .collect::<SpatialResult<_>>()?;

        for (i, near) in per_node.iter().enumerate() {
            for &j in near {
                b.add_edge(NodeId(i as u32), j);
            }
        }

        let graph = b.build();
        log::info!(
            "pairwise graph: {} nodes, {} edges within {max_d} m ({:?})",
            graph.node_count(),
            graph.edge_count(),
            started.elapsed()
        );
        Ok(graph)
    }

    // ── Lattice ───────────────────────────────────────────────────────────

    /// Regular grid covering `bbox`.  Node `(r, c)` gets
    /// `LocationId(r * cols + c)` and risk `field.risk_at(pos)`.
    pub fn lattice<F: RiskField + ?Sized>(
        &self,
        bbox: BBox,
        spec: LatticeSpec,
        field: &F,
    ) -> SpatialResult<RiskGraph> {
        self.lattice_from(bbox, spec, field, 0)
    }

    /// [`Self::lattice`] with node `(r, c)` numbered `first_id + r * cols + c`,
    /// so grid ids can be kept apart from ingested location ids.
    pub fn lattice_from<F: RiskField + ?Sized>(
        &self,
        bbox: BBox,
        spec: LatticeSpec,
        field: &F,
        first_id: u32,
    ) -> SpatialResult<RiskGraph> {
        let cells = spec.rows.checked_mul(spec.cols).and_then(|n| u32::try_from(n).ok());
        if cells.and_then(|n| first_id.checked_add(n)).is_none() {
            return Err(SrError::Config(format!(
                "lattice {}×{} starting at id {first_id} overflows the id space",
                spec.rows, spec.cols
            ))
            .into());
        }
        if spec.rows == 0 || spec.cols == 0 {
            return Err(SrError::Config(format!(
                "lattice needs at least one row and column, got {}×{}",
                spec.rows, spec.cols
            ))
            .into());
        }
        let started = Instant::now();
        let step = |extent: f64, n: usize| if n > 1 { extent / (n - 1) as f64 } else { 0.0 };
        let dlat = step(bbox.height_deg(), spec.rows);
        let dlon = step(bbox.width_deg(), spec.cols);

        let node_at = |r: usize, c: usize| NodeId((r * spec.cols + c) as u32);
        let mut b = RiskGraphBuilder::with_capacity(spec.rows * spec.cols, spec.rows * spec.cols * 4);
        for r in 0..spec.rows {
            self.check_deadline(started, "lattice nodes")?;
            for c in 0..spec.cols {
                let pos = GeoPoint::new(bbox.min.lat + r as f64 * dlat, bbox.min.lon + c as f64 * dlon);
                let id = LocationId(first_id + (r * spec.cols + c) as u32);
                b.add_node(id, pos, field.risk_at(pos))?;
            }
        }

        let max_d = self.max_connection_distance_m;
        let mut too_long = 0usize;
        // Forward half of the 8-neighbourhood; each undirected edge once.
        const FORWARD: [(usize, isize); 4] = [(0, 1), (1, -1), (1, 0), (1, 1)];
        for r in 0..spec.rows {
            self.check_deadline(started, "lattice adjacency")?;
            for c in 0..spec.cols {
                for (dr, dc) in FORWARD {
                    let (nr, nc) = (r + dr, c as isize + dc);
                    if nr >= spec.rows || nc < 0 || nc as usize >= spec.cols {
                        continue;
                    }
                    let (a, z) = (node_at(r, c), node_at(nr, nc as usize));
                    if b.node_pos(a).planar_distance_m(b.node_pos(z)) > max_d {
                        too_long += 1;
                        continue;
                    }
                    b.add_edge(a, z);
                }
            }
        }
        if too_long > 0 {
            log::debug!("lattice: skipped {too_long} neighbour links longer than {max_d} m");
        }

        let graph = b.build();
        log::info!(
            "lattice graph: {}×{} = {} nodes, {} edges ({:?})",
            spec.rows,
            spec.cols,
            graph.node_count(),
            graph.edge_count(),
            started.elapsed()
        );
        Ok(graph)
    }
}
