//! `sr-spatial`: risk-weighted graph construction and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RiskGraph` (CSR + R-tree), `RiskGraphBuilder`, `GraphStats`|
//! | [`builder`] | `GraphBuilder`: pairwise proximity graph and lattice graph  |
//! | [`field`]   | `RiskField` trait, `IdwField` point-risk interpolation      |
//! | [`view`]    | `GraphView` trait, `NodeAttrs`, `EdgeAttrs`                 |
//! | [`router`]  | `RouteFinder`, `Route`, `RouteStats`, `RouteComparison`     |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Edge cost
//!
//! Every edge carries its planar length, the mean risk of its endpoints, and
//! `weight = distance × (1 + 2 × risk)`.  Safest-route search minimises
//! `weight`; shortest-route search minimises `distance`.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod builder;
pub mod error;
pub mod field;
pub mod network;
pub mod router;
pub mod view;


pub use builder::{GraphBuilder, LatticeSpec};
pub use error::{SpatialError, SpatialResult};
pub use field::{IdwField, RiskField};
pub use network::{GraphStats, RiskGraph, RiskGraphBuilder, edge_weight};
pub use router::{CostKind, Route, RouteComparison, RouteFinder, RouteStats};
pub use view::{EdgeAttrs, GraphView, NodeAttrs};
