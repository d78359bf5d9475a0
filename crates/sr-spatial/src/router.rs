//! Safest / shortest route search and route statistics.
//!
//! # Cost interpretations
//!
//! | [`CostKind`]  | Edge cost   | Used by                                 |
//! |---------------|-------------|-----------------------------------------|
//! | `Weight`      | `weight`    | [`RouteFinder::find_safest_route`]      |
//! | `Distance`    | `distance`  | [`RouteFinder::find_shortest_route`]    |
//!
//! Both run the same Dijkstra over any [`GraphView`].  Edge costs are
//! non-negative by construction.  Heap entries are ordered by `(cost,
//! NodeId)`, so among equal-cost candidates the lower `NodeId` settles first
//! and repeated queries on the same graph return the same path.
//!
//! # Missing segments
//!
//! [`RouteFinder::route_info`] is lenient: a consecutive pair with no edge
//! (a stale path from an older graph) contributes nothing to the totals.
//! The count of such pairs is reported in [`RouteStats::missing_segments`]
//! so callers can reject stale paths themselves.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use sr_core::{GeoPoint, LocationId, NodeId};

use crate::{GraphView, SpatialError, SpatialResult};

// ── CostKind ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CostKind {
    /// Risk-adjusted cost (`distance × (1 + 2 × risk)`).
    Weight,
    /// Physical length only.
    Distance,
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// An ordered, non-empty sequence of locations from start to end.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub nodes: Vec<LocationId>,
    /// Sum of the minimised edge cost along the route.
    pub total_cost: f64,
    pub cost_kind: CostKind,
}

impl Route {
    /// Number of edges traversed.
    pub fn segments(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// `true` if the start and end are the same location.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }
}

// ── RouteStats ────────────────────────────────────────────────────────────────

/// Aggregates over a route's edges.  All zero for a path of fewer than two
/// nodes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteStats {
    pub total_distance_m: f64,
    pub total_risk: f64,
    /// `total_risk / num_segments`.
    pub avg_risk: f64,
    pub num_segments: usize,
    /// Consecutive pairs with no connecting edge in the graph.
    pub missing_segments: usize,
}

/// Side-by-side statistics for two routes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteComparison {
    pub first: RouteStats,
    pub second: RouteStats,
    /// `first.total_distance_m − second.total_distance_m`.
    pub distance_difference_m: f64,
    /// `first.avg_risk − second.avg_risk`.
    pub risk_difference: f64,
}

// ── RouteFinder ───────────────────────────────────────────────────────────────

/// Route queries over a borrowed, immutable graph.
pub struct RouteFinder<'g, G: GraphView> {
    graph: &'g G,
}

impl<'g, G: GraphView> RouteFinder<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &'g G {
        self.graph
    }

    fn require(&self, id: LocationId) -> SpatialResult<NodeId> {
        self.graph.resolve(id).ok_or(SpatialError::NodeNotFound(id))
    }

    /// Minimum-`weight` route.  `Ok(None)` if `start` and `end` lie in
    /// different components.
    pub fn find_safest_route(&self, start: LocationId, end: LocationId) -> SpatialResult<Option<Route>> {
        self.find_route(start, end, CostKind::Weight)
    }

    /// Minimum-`distance` route, the baseline for the safety trade-off.
    pub fn find_shortest_route(&self, start: LocationId, end: LocationId) -> SpatialResult<Option<Route>> {
        self.find_route(start, end, CostKind::Distance)
    }

    /// Minimum-cost route under `kind`.
    ///
    /// Fails with [`SpatialError::NodeNotFound`] if either endpoint is not in
    /// the graph.
    pub fn find_route(
        &self,
        start: LocationId,
        end: LocationId,
        kind: CostKind,
    ) -> SpatialResult<Option<Route>> {
        let from = self.require(start)?;
        let to = self.require(end)?;

        let Some((nodes, total_cost)) = dijkstra(self.graph, from, to, kind) else {
            log::debug!("no {kind:?} route from {start} to {end}");
            return Ok(None);
        };
        let nodes = nodes.into_iter().map(|n| self.graph.node(n).location).collect();
        Ok(Some(Route { nodes, total_cost, cost_kind: kind }))
    }

    /// Distance and risk totals over consecutive pairs of `path`.
    pub fn route_info(&self, path: &[LocationId]) -> RouteStats {
        if path.len() < 2 {
            return RouteStats::default();
        }

        let mut stats = RouteStats { num_segments: path.len() - 1, ..RouteStats::default() };
        for pair in path.windows(2) {
            let edge = self
                .graph
                .resolve(pair[0])
                .zip(self.graph.resolve(pair[1]))
                .and_then(|(a, b)| self.graph.edge_attrs(a, b));
            match edge {
                Some(e) => {
                    stats.total_distance_m += e.distance_m;
                    stats.total_risk += e.risk;
                }
                None => stats.missing_segments += 1,
            }
        }
        stats.avg_risk = stats.total_risk / stats.num_segments as f64;

        if stats.missing_segments > 0 {
            log::debug!(
                "route_info: {} of {} segments have no edge",
                stats.missing_segments,
                stats.num_segments
            );
        }
        stats
    }

    /// Statistics for both routes plus their differences.
    pub fn compare_routes(&self, first: &[LocationId], second: &[LocationId]) -> RouteComparison {
        let first = self.route_info(first);
        let second = self.route_info(second);
        RouteComparison {
            first,
            second,
            distance_difference_m: first.total_distance_m - second.total_distance_m,
            risk_difference: first.avg_risk - second.avg_risk,
        }
    }

    /// Coordinates of each location in path order.
    pub fn route_coordinates(&self, path: &[LocationId]) -> SpatialResult<Vec<GeoPoint>> {
        path.iter()
            .map(|&id| self.require(id).map(|n| self.graph.node(n).pos))
            .collect()
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Total order over non-negative finite costs.
#[derive(Copy, Clone, PartialEq, Debug)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra<G: GraphView>(
    graph: &G,
    from: NodeId,
    to: NodeId,
    kind: CostKind,
) -> Option<(Vec<NodeId>, f64)> {
    if from == to {
        return Some((vec![from], 0.0));
    }

    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    // prev[v] = node that reached v; NodeId::INVALID for unreached nodes.
    let mut prev = vec![NodeId::INVALID; n];
    dist[from.index()] = 0.0;

    // Min-heap on (cost, node); the NodeId breaks ties deterministically.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == to {
            return Some((reconstruct(&prev, from, to), cost));
        }
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for (neighbor, edge) in graph.neighbors(node) {
            let next = cost + edge.cost(kind);
            if next < dist[neighbor.index()] {
                dist[neighbor.index()] = next;
                prev[neighbor.index()] = node;
                heap.push(Reverse((Cost(next), neighbor)));
            }
        }
    }

    None
}

fn reconstruct(prev: &[NodeId], from: NodeId, to: NodeId) -> Vec<NodeId> {
    let mut path = vec![to];
    let mut cur = to;
    while cur != from {
        cur = prev[cur.index()];
        path.push(cur);
    }
    path.reverse();
    path
}
