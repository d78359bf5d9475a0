//! Risk graph representation and low-level builder.
//!
//! # Data layout
//!
//! The graph is an arena: nodes are dense `NodeId`s indexing parallel
//! vectors, and undirected edges are stored as two directed half-edges in
//! **Compressed Sparse Row (CSR)** order.  Given a `NodeId n`, its outgoing
//! half-edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Half-edges are sorted by `(from, to)`, so adjacency iteration order is a
//! pure function of the node set and edge set.  That makes route search
//! deterministic for a fixed graph.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest node.  Used to
//! snap raw user coordinates to a routable location.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use sr_core::{EdgeId, GeoPoint, LocationId, NodeId};

use crate::{SpatialError, SpatialResult};

/// Routing cost of an edge: `distance × (1 + 2 × risk)`.
///
/// For `risk ∈ [0, 1]` the weight lies in `[distance, 3 × distance]`, so risk
/// can at most triple an edge's effective length.
#[inline]
pub fn edge_weight(distance_m: f64, risk: f64) -> f64 {
    distance_m * (1.0 + 2.0 * risk)
}

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone, Debug)]
pub(crate) struct NodeEntry {
    pub(crate) point: [f64; 2],
    pub(crate) id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared distance in raw lat/lon degrees.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── GraphStats ────────────────────────────────────────────────────────────────

/// Summary figures for a built graph.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphStats {
    pub node_count: usize,
    /// Undirected edge count.
    pub edge_count: usize,
    /// `true` iff the graph has at least one node and a single component.
    pub is_connected: bool,
    pub avg_degree: f64,
}

// ── RiskGraph ─────────────────────────────────────────────────────────────────

/// Undirected risk graph in CSR format plus a spatial index.
///
/// Immutable once built.  Construct with [`RiskGraphBuilder`] or
/// [`crate::GraphBuilder`].
#[derive(Debug)]
pub struct RiskGraph {
    // ── Node data (indexed by NodeId) ─────────────────────────────────────
    pub node_location: Vec<LocationId>,
    pub node_pos: Vec<GeoPoint>,
    /// Risk score of each node, in `[0, 1]`.
    pub node_risk: Vec<f64>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Half-edge data (indexed by EdgeId) ────────────────────────────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    /// Planar length in metres.
    pub edge_distance_m: Vec<f64>,
    /// Mean of the two endpoint risks.
    pub edge_risk: Vec<f64>,
    /// Safety-aware routing cost, see [`edge_weight`].
    pub edge_weight: Vec<f64>,

    id_index: FxHashMap<LocationId, NodeId>,
    spatial_idx: RTree<NodeEntry>,
}

impl RiskGraph {
    /// A graph with no nodes.  Every lookup against it fails.
    pub fn empty() -> Self {
        RiskGraphBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_to.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Identity ──────────────────────────────────────────────────────────

    /// Graph node for a location id.
    #[inline]
    pub fn resolve(&self, id: LocationId) -> Option<NodeId> {
        self.id_index.get(&id).copied()
    }

    /// Like [`resolve`](Self::resolve) but fails with
    /// [`SpatialError::NodeNotFound`].
    pub fn require(&self, id: LocationId) -> SpatialResult<NodeId> {
        self.resolve(id).ok_or(SpatialError::NodeNotFound(id))
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.id_index.contains_key(&id)
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// `EdgeId`s of all half-edges leaving `node`, ordered by destination.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        (self.node_out_start[node.index() + 1] - self.node_out_start[node.index()]) as usize
    }

    /// The half-edge `a → b`, if the two nodes are adjacent.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        if a.index() >= self.node_count() {
            return None;
        }
        let start = self.node_out_start[a.index()] as usize;
        let end = self.node_out_start[a.index() + 1] as usize;
        // Destinations within a CSR row are sorted.
        self.edge_to[start..end]
            .binary_search(&b)
            .ok()
            .map(|off| EdgeId((start + off) as u32))
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Location nearest to `pos` by squared coordinate distance.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn nearest_node(&self, pos: GeoPoint) -> Option<LocationId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| self.node_location[e.id.index()])
    }

    /// Up to `k` nearest locations to `pos`, by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<LocationId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| self.node_location[e.id.index()])
            .collect()
    }

    // ── Connectivity ──────────────────────────────────────────────────────

    /// Component label of each node.  Labels are assigned `0, 1, …` in order
    /// of each component's lowest `NodeId`.
    pub fn components(&self) -> Vec<u32> {
        let n = self.node_count();
        let mut label = vec![u32::MAX; n];
        let mut stack = Vec::new();
        let mut next = 0u32;

        for root in 0..n {
            if label[root] != u32::MAX {
                continue;
            }
            label[root] = next;
            stack.push(NodeId(root as u32));
            while let Some(node) = stack.pop() {
                for e in self.out_edges(node) {
                    let to = self.edge_to[e.index()];
                    if label[to.index()] == u32::MAX {
                        label[to.index()] = next;
                        stack.push(to);
                    }
                }
            }
            next += 1;
        }
        label
    }

    /// Label of the component holding `id`, numbered as in
    /// [`Self::components`].
    pub fn component_of(&self, id: LocationId) -> Option<u32> {
        let node = self.resolve(id)?;
        Some(self.components()[node.index()])
    }

    pub fn component_count(&self) -> usize {
        self.components().iter().max().map_or(0, |&m| m as usize + 1)
    }

    pub fn stats(&self) -> GraphStats {
        let n = self.node_count();
        GraphStats {
            node_count: n,
            edge_count: self.edge_count(),
            is_connected: n > 0 && self.component_count() == 1,
            avg_degree: if n > 0 { self.edge_to.len() as f64 / n as f64 } else { 0.0 },
        }
    }
}

// ── RiskGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RiskGraph`] incrementally, then call [`build`](Self::build).
///
/// Edge attributes are derived here and nowhere else: `distance` from the
/// endpoint positions, `risk` as the mean endpoint risk, `weight` via
/// [`edge_weight`].
///
/// # Example
///
/// ```
/// use sr_core::{GeoPoint, LocationId};
/// use sr_spatial::RiskGraphBuilder;
///
/// let mut b = RiskGraphBuilder::new();
/// let a = b.add_node(LocationId(1), GeoPoint::new(0.0, 0.0), 0.2).unwrap();
/// let c = b.add_node(LocationId(2), GeoPoint::new(0.001, 0.0), 0.4).unwrap();
/// b.add_edge(a, c);
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 1);
/// ```
pub struct RiskGraphBuilder {
    locations: Vec<LocationId>,
    positions: Vec<GeoPoint>,
    risks: Vec<f64>,
    id_index: FxHashMap<LocationId, NodeId>,
    raw_edges: Vec<(NodeId, NodeId)>,
}

impl RiskGraphBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Pre-allocate for the expected number of nodes and undirected edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        let mut id_index = FxHashMap::default();
        id_index.reserve(nodes);
        Self {
            locations: Vec::with_capacity(nodes),
            positions: Vec::with_capacity(nodes),
            risks: Vec::with_capacity(nodes),
            id_index,
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).  `risk` is
    /// clamped into `[0, 1]`.
    pub fn add_node(&mut self, id: LocationId, pos: GeoPoint, risk: f64) -> SpatialResult<NodeId> {
        if !pos.is_finite() || !risk.is_finite() {
            return Err(SpatialError::NonFinite(id));
        }
        if self.id_index.contains_key(&id) {
            return Err(SpatialError::DuplicateLocation(id));
        }
        let node = NodeId(self.locations.len() as u32);
        self.id_index.insert(id, node);
        self.locations.push(id);
        self.positions.push(pos);
        self.risks.push(risk.clamp(0.0, 1.0));
        Ok(node)
    }

    /// Add an undirected edge.  Self-loops are ignored; a repeated pair is
    /// stored once.  Both ends must come from [`Self::add_node`].
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) {
        debug_assert!(
            a.index() < self.locations.len() && b.index() < self.locations.len(),
            "edge {a}-{b} references a node not yet added ({} nodes)",
            self.locations.len()
        );
        if a != b {
            self.raw_edges.push((a.min(b), a.max(b)));
        }
    }

    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.positions[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.locations.len()
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    /// Consume the builder and produce a [`RiskGraph`].
    ///
    /// Time complexity: O(E log E) for the half-edge sort + O(N log N) for
    /// the R-tree bulk load.
    pub fn build(self) -> RiskGraph {
        let node_count = self.locations.len();

        let mut pairs = self.raw_edges;
        pairs.sort_unstable();
        pairs.dedup();

        // Expand to both directions and sort by (from, to) for CSR.
        let mut half: Vec<(NodeId, NodeId)> = Vec::with_capacity(pairs.len() * 2);
        for &(a, b) in &pairs {
            half.push((a, b));
            half.push((b, a));
        }
        half.sort_unstable();

        let mut edge_from = Vec::with_capacity(half.len());
        let mut edge_to = Vec::with_capacity(half.len());
        let mut edge_distance_m = Vec::with_capacity(half.len());
        let mut edge_risk = Vec::with_capacity(half.len());
        let mut edge_weight_v = Vec::with_capacity(half.len());
        for &(a, b) in &half {
            let distance = self.positions[a.index()].planar_distance_m(self.positions[b.index()]);
            let risk = (self.risks[a.index()] + self.risks[b.index()]) * 0.5;
            edge_from.push(a);
            edge_to.push(b);
            edge_distance_m.push(distance);
            edge_risk.push(risk);
            edge_weight_v.push(edge_weight(distance, risk));
        }

        let mut node_out_start = vec![0u32; node_count + 1];
        for &(a, _) in &half {
            node_out_start[a.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, half.len());

        let entries: Vec<NodeEntry> = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| NodeEntry { point: [p.lat, p.lon], id: NodeId(i as u32) })
            .collect();

        RiskGraph {
            node_location: self.locations,
            node_pos: self.positions,
            node_risk: self.risks,
            node_out_start,
            edge_from,
            edge_to,
            edge_distance_m,
            edge_risk,
            edge_weight: edge_weight_v,
            id_index: self.id_index,
            spatial_idx: RTree::bulk_load(entries),
        }
    }
}

impl Default for RiskGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
