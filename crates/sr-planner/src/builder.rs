//! Fluent builder for constructing a [`Planner`].

use sr_core::{IncidentRecord, Location, RouteConfig};
use sr_spatial::LatticeSpec;

use crate::{Planner, PlannerResult};

/// Which graph the planner routes on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Topology {
    /// Every location is a node; pairs within the distance ceiling are
    /// edges.
    #[default]
    Pairwise,
    /// A regular grid over the locations' bounding box.  Grid nodes take
    /// their risk from an inverse-distance field over the scored locations.
    ///
    /// Grid node `(r, c)` is `LocationId(first + r * cols + c)`, where
    /// `first` is one past the largest ingested id.  Route queries take
    /// grid ids; [`crate::Planner::score_of`] takes ingested ids.  Use
    /// [`crate::Planner::plan_between`] to route between coordinates.
    Lattice(LatticeSpec),
}

/// Fluent builder for [`Planner`].
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                |
/// |-------------------|------------------------|
/// | `.incidents(v)`   | No incidents           |
/// | `.topology(t)`    | `Topology::Pairwise`   |
///
/// # Example
///
/// ```rust,ignore
/// let planner = PlannerBuilder::new(config, locations)
///     .incidents(incidents)
///     .topology(Topology::Lattice(LatticeSpec { rows: 40, cols: 40 }))
///     .build()?;
/// ```
pub struct PlannerBuilder {
    config:    RouteConfig,
    locations: Vec<Location>,
    incidents: Vec<IncidentRecord>,
    topology:  Topology,
}

impl PlannerBuilder {
    pub fn new(config: RouteConfig, locations: Vec<Location>) -> Self {
        Self {
            config,
            locations,
            incidents: Vec::new(),
            topology:  Topology::default(),
        }
    }

    pub fn incidents(mut self, incidents: Vec<IncidentRecord>) -> Self {
        self.incidents = incidents;
        self
    }

    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Validate the config, fit the risk model at `config.query_hour`, and
    /// build the graph.
    pub fn build(self) -> PlannerResult<Planner> {
        self.config.validate()?;
        Planner::assemble(self.config, self.locations, self.incidents, self.topology)
    }
}
