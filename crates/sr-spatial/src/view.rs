//! Read-only graph contract consumed by route search.
//!
//! [`crate::RouteFinder`] is generic over [`GraphView`], so it never touches
//! the CSR arrays directly.  Any representation that can enumerate a node's
//! neighbours with `(distance, risk, weight)` attributes can be routed on.

use sr_core::{GeoPoint, LocationId, NodeId};

use crate::{CostKind, RiskGraph};

/// Attributes of one graph node.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeAttrs {
    pub location: LocationId,
    pub pos: GeoPoint,
    pub risk: f64,
}

/// Attributes of one undirected edge.  Identical from either end.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeAttrs {
    pub distance_m: f64,
    pub risk: f64,
    pub weight: f64,
}

impl EdgeAttrs {
    /// The attribute a search under `kind` minimises.
    #[inline]
    pub fn cost(&self, kind: CostKind) -> f64 {
        match kind {
            CostKind::Weight => self.weight,
            CostKind::Distance => self.distance_m,
        }
    }
}

pub trait GraphView {
    fn node_count(&self) -> usize;

    /// Dense node for an external location id.
    fn resolve(&self, id: LocationId) -> Option<NodeId>;

    /// Attributes of `node`.  `node` must be `< node_count()`.
    fn node(&self, node: NodeId) -> NodeAttrs;

    /// Neighbours of `node` with the connecting edge's attributes, in a
    /// fixed order.
    fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, EdgeAttrs)> + '_;

    /// Attributes of the edge between `a` and `b`, if any.
    fn edge_attrs(&self, a: NodeId, b: NodeId) -> Option<EdgeAttrs>;
}

impl RiskGraph {
    /// Attributes of the node for `id`.  Fails with
    /// [`crate::SpatialError::NodeNotFound`] if `id` is not in the graph.
    pub fn node_info(&self, id: LocationId) -> crate::SpatialResult<NodeAttrs> {
        self.require(id).map(|n| GraphView::node(self, n))
    }

    /// Attributes of the edge between two locations, if both exist and are
    /// adjacent.
    pub fn edge(&self, a: LocationId, b: LocationId) -> Option<EdgeAttrs> {
        let (a, b) = (self.resolve(a)?, self.resolve(b)?);
        self.edge_attrs(a, b)
    }

    #[inline]
    fn attrs_of(&self, e: sr_core::EdgeId) -> EdgeAttrs {
        EdgeAttrs {
            distance_m: self.edge_distance_m[e.index()],
            risk: self.edge_risk[e.index()],
            weight: self.edge_weight[e.index()],
        }
    }
}

impl GraphView for RiskGraph {
    fn node_count(&self) -> usize {
        RiskGraph::node_count(self)
    }

    fn resolve(&self, id: LocationId) -> Option<NodeId> {
        RiskGraph::resolve(self, id)
    }

    fn node(&self, node: NodeId) -> NodeAttrs {
        NodeAttrs {
            location: self.node_location[node.index()],
            pos: self.node_pos[node.index()],
            risk: self.node_risk[node.index()],
        }
    }

    fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, EdgeAttrs)> + '_ {
        self.out_edges(node).map(|e| (self.edge_to[e.index()], self.attrs_of(e)))
    }

    fn edge_attrs(&self, a: NodeId, b: NodeId) -> Option<EdgeAttrs> {
        self.edge_between(a, b).map(|e| self.attrs_of(e))
    }
}
