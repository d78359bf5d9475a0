//! `sr-core`: foundational types for the `saferoute` routing engine.
//!
//! This crate is a dependency of every other `sr-*` crate.  It has no `sr-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`ids`]      | `LocationId`, `NodeId`, `EdgeId`                         |
//! | [`geo`]      | `GeoPoint`, planar city-scale distance, `BBox`           |
//! | [`location`] | `Location`, `IncidentRecord`, `Severity`                 |
//! | [`config`]   | `RouteConfig` and its defaults                           |
//! | [`rng`]      | `SeededRng` (deterministic model fitting)                |
//! | [`error`]    | `SrError`, `SrResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod location;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::RouteConfig;
pub use error::{SrError, SrResult};
pub use geo::{BBox, GeoPoint};
pub use ids::{EdgeId, LocationId, NodeId};
pub use location::{IncidentRecord, Location, Severity};
pub use rng::SeededRng;
