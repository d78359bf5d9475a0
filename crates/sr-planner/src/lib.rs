//! `sr-planner`: end-to-end safe-route planning.
//!
//! Ties the pipeline together:
//!
//! ```text
//! locations + incidents
//!   ① aggregate_features at the query hour
//!   ② FittedRiskModel::fit, then predict one score per location
//!   ③ GraphBuilder::pairwise (or ::lattice over an IdwField)
//!   ④ RouteFinder: safest + shortest + comparison
//! ```
//!
//! Changing the query hour with [`Planner::set_query_hour`] re-runs ① to ③,
//! so the graph never carries scores from a different hour.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sr_core::RouteConfig;
//! use sr_planner::PlannerBuilder;
//!
//! let planner = PlannerBuilder::new(RouteConfig::default(), locations)
//!     .incidents(incidents)
//!     .build()?;
//! let plan = planner.plan(start, end)?;
//! ```

pub mod builder;
pub mod error;
pub mod planner;

#[cfg(test)]
mod tests;

pub use builder::{PlannerBuilder, Topology};
pub use error::{PlannerError, PlannerResult};
pub use planner::{Planner, RoutePlan};
