//! The assembled planner and its route queries.

use std::time::Instant;

use sr_core::{BBox, GeoPoint, IncidentRecord, Location, LocationId, RouteConfig};
use sr_risk::{FittedRiskModel, LocationFeatures, RiskCategory, aggregate_features};
use sr_spatial::{
    GraphBuilder, IdwField, RiskGraph, Route, RouteComparison, RouteFinder, RouteStats,
};

use crate::{PlannerError, PlannerResult, Topology};

/// Safest and shortest routes between one pair of locations.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub start: LocationId,
    pub end: LocationId,
    pub safest: Option<Route>,
    pub shortest: Option<Route>,
    /// `first` = safest, `second` = shortest.  `None` when no route exists.
    pub comparison: Option<RouteComparison>,
}

impl RoutePlan {
    /// `true` when start and end are connected.
    pub fn is_reachable(&self) -> bool {
        self.safest.is_some()
    }

    pub fn safest_stats(&self) -> Option<RouteStats> {
        self.comparison.map(|c| c.first)
    }

    pub fn shortest_stats(&self) -> Option<RouteStats> {
        self.comparison.map(|c| c.second)
    }
}

/// Scored locations, their graph, and the model that scored them.
///
/// Every field derived from the query hour (features, model, scores, graph)
/// is replaced together, so they always agree with `config.query_hour`.
#[derive(Debug)]
pub struct Planner {
    config:    RouteConfig,
    topology:  Topology,
    locations: Vec<Location>,
    incidents: Vec<IncidentRecord>,
    features:  Vec<LocationFeatures>,
    model:     FittedRiskModel,
    scores:    Vec<f64>,
    graph:     RiskGraph,
}

/// Hour-dependent state, built off to the side before being swapped in.
struct Scored {
    features: Vec<LocationFeatures>,
    model:    FittedRiskModel,
    scores:   Vec<f64>,
    graph:    RiskGraph,
}

impl Planner {
    pub(crate) fn assemble(
        config: RouteConfig,
        locations: Vec<Location>,
        incidents: Vec<IncidentRecord>,
        topology: Topology,
    ) -> PlannerResult<Self> {
        let s = score_and_build(&config, &locations, &incidents, topology)?;
        Ok(Self {
            config,
            topology,
            locations,
            incidents,
            features: s.features,
            model: s.model,
            scores: s.scores,
            graph: s.graph,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn features(&self) -> &[LocationFeatures] {
        &self.features
    }

    pub fn model(&self) -> &FittedRiskModel {
        &self.model
    }

    /// One score per location, same order as [`Self::locations`].
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn graph(&self) -> &RiskGraph {
        &self.graph
    }

    pub fn finder(&self) -> RouteFinder<'_, RiskGraph> {
        RouteFinder::new(&self.graph)
    }

    /// Score of an ingested location.
    pub fn score_of(&self, id: LocationId) -> Option<f64> {
        self.locations.iter().position(|l| l.id == id).map(|i| self.scores[i])
    }

    /// `[low, medium, high]` location counts.
    pub fn risk_distribution(&self) -> [usize; 3] {
        RiskCategory::tally(&self.scores)
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Re-aggregate features for `hour`, refit, rescore, and rebuild the
    /// graph.  On error the planner keeps its previous hour and state.
    pub fn set_query_hour(&mut self, hour: u8) -> PlannerResult<()> {
        if hour == self.config.query_hour {
            return Ok(());
        }
        let config = RouteConfig { query_hour: hour, ..self.config.clone() };
        config.validate()?;
        let s = score_and_build(&config, &self.locations, &self.incidents, self.topology)?;

        self.config = config;
        self.features = s.features;
        self.model = s.model;
        self.scores = s.scores;
        self.graph = s.graph;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Safest and shortest routes from `start` to `end`.
    pub fn plan(&self, start: LocationId, end: LocationId) -> PlannerResult<RoutePlan> {
        let finder = self.finder();
        let safest = finder.find_safest_route(start, end)?;
        let shortest = finder.find_shortest_route(start, end)?;
        let comparison = match (&safest, &shortest) {
            (Some(a), Some(b)) => Some(finder.compare_routes(&a.nodes, &b.nodes)),
            _ => None,
        };
        if let Some(c) = &comparison {
            log::info!(
                "{start} → {end}: safest {:.0} m / risk {:.3}, shortest {:.0} m / risk {:.3}",
                c.first.total_distance_m,
                c.first.avg_risk,
                c.second.total_distance_m,
                c.second.avg_risk
            );
        } else {
            log::info!("{start} → {end}: no route");
        }
        Ok(RoutePlan { start, end, safest, shortest, comparison })
    }

    /// [`Self::plan`] between the graph nodes nearest to two coordinates.
    pub fn plan_between(&self, from: GeoPoint, to: GeoPoint) -> PlannerResult<RoutePlan> {
        let start = self.graph.nearest_node(from).ok_or(PlannerError::NoLocations)?;
        let end = self.graph.nearest_node(to).ok_or(PlannerError::NoLocations)?;
        self.plan(start, end)
    }
}

/// First grid id, one past the largest ingested id.
pub(crate) fn lattice_first_id(locations: &[Location]) -> u32 {
    locations.iter().map(|l| l.id.0.saturating_add(1)).max().unwrap_or(0)
}

fn score_and_build(
    config: &RouteConfig,
    locations: &[Location],
    incidents: &[IncidentRecord],
    topology: Topology,
) -> PlannerResult<Scored> {
    if locations.is_empty() {
        return Err(PlannerError::NoLocations);
    }
    let started = Instant::now();

    let features =
        aggregate_features(locations, incidents, config.query_hour, config.recent_window_hours);
    let model = FittedRiskModel::fit(&features, config)?;
    let scores = model.predict(&features);

    let builder = GraphBuilder::from_config(config)?;
    let graph = match topology {
        Topology::Pairwise => builder.pairwise(locations, &scores)?,
        Topology::Lattice(spec) => {
            let bbox = BBox::enclosing(locations.iter().map(|l| l.pos))
                .ok_or(PlannerError::NoLocations)?;
            let field = IdwField::new(locations, &scores, IdwField::DEFAULT_K)?;
            builder.lattice_from(bbox, spec, &field, lattice_first_id(locations))?
        }
    };

    let [low, medium, high] = RiskCategory::tally(&scores);
    log::info!(
        "hour {}: scored {} locations ({low} low, {medium} medium, {high} high), graph {} nodes / {} edges ({:?})",
        config.query_hour,
        locations.len(),
        graph.node_count(),
        graph.edge_count(),
        started.elapsed()
    );
    Ok(Scored { features, model, scores, graph })
}
