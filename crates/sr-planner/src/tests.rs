//! Integration tests for sr-planner.

use sr_core::{IncidentRecord, Location, LocationId, RouteConfig, Severity};

use crate::{Planner, PlannerBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config() -> RouteConfig {
    RouteConfig {
        max_connection_distance_m: 150.0,
        kmeans_restarts: 3,
        ..RouteConfig::default()
    }
}

/// 4 × 4 equator grid, 0.001° (~111 m) apart, ids `r * 4 + c`.  Lighting
/// gets worse towards the middle column pair.
fn grid() -> Vec<Location> {
    let mut out = Vec::new();
    for r in 0..4u32 {
        for c in 0..4u32 {
            let lighting = if c == 1 || c == 2 { 0.3 } else { 0.9 };
            out.push(Location::new(LocationId(r * 4 + c), r as f64 * 0.001, c as f64 * 0.001, lighting));
        }
    }
    out
}

/// Heavy incident load on locations 5 and 6, a few elsewhere; the heavy
/// ones all happen around 02:00.
fn incidents() -> Vec<IncidentRecord> {
    let mut out = Vec::new();
    for id in [5u32, 6] {
        for i in 0..8 {
            let severity = if i % 2 == 0 { Severity::High } else { Severity::Medium };
            out.push(IncidentRecord::new(LocationId(id), 1 + (i % 3) as u8, severity));
        }
    }
    for id in [0u32, 3, 9, 14] {
        out.push(IncidentRecord::new(LocationId(id), 18, Severity::Low));
    }
    out
}

fn planner() -> Planner {
    PlannerBuilder::new(test_config(), grid()).incidents(incidents()).build().unwrap()
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod build {
    use sr_core::{Location, LocationId, RouteConfig};
    use sr_risk::RiskError;

    use super::*;
    use crate::PlannerError;

    #[test]
    fn scores_every_location() {
        let p = planner();
        assert_eq!(p.scores().len(), 16);
        assert!(p.scores().iter().all(|s| (0.0..=1.0).contains(s)));
        assert_eq!(p.graph().node_count(), 16);
        assert_eq!(p.risk_distribution().iter().sum::<usize>(), 16);
        assert!(p.graph().stats().is_connected);
    }

    #[test]
    fn hotspot_scores_above_quiet_corner() {
        let p = planner();
        assert!(p.score_of(LocationId(5)).unwrap() > p.score_of(LocationId(12)).unwrap());
        assert_eq!(p.score_of(LocationId(99)), None);
    }

    #[test]
    fn deterministic() {
        assert_eq!(planner().scores(), planner().scores());
    }

    #[test]
    fn empty_locations() {
        let err = PlannerBuilder::new(RouteConfig::default(), Vec::new()).build().unwrap_err();
        assert!(matches!(err, PlannerError::NoLocations));
    }

    #[test]
    fn fewer_locations_than_clusters() {
        let locs = vec![
            Location::new(LocationId(1), 0.0, 0.0, 0.5),
            Location::new(LocationId(2), 0.0, 0.001, 0.5),
        ];
        let err = PlannerBuilder::new(RouteConfig::default(), locs).build().unwrap_err();
        assert!(matches!(err, PlannerError::Risk(RiskError::TooFewLocations { clusters: 3, locations: 2 })));
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = RouteConfig { n_clusters: 0, ..RouteConfig::default() };
        let err = PlannerBuilder::new(cfg, grid()).build().unwrap_err();
        assert!(matches!(err, PlannerError::Core(_)));
    }
}

// ── Route queries ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod plan {
    use sr_core::{GeoPoint, Location, LocationId, RouteConfig};
    use sr_spatial::SpatialError;

    use super::*;
    use crate::PlannerError;

    #[test]
    fn safest_and_shortest_trade_off() {
        let p = planner();
        let plan = p.plan(LocationId(4), LocationId(7)).unwrap();
        assert!(plan.is_reachable());
        let safest = plan.safest.as_ref().unwrap();
        let shortest = plan.shortest.as_ref().unwrap();
        assert_eq!(safest.nodes.first(), Some(&LocationId(4)));
        assert_eq!(safest.nodes.last(), Some(&LocationId(7)));

        let safe = plan.safest_stats().unwrap();
        let short = plan.shortest_stats().unwrap();
        assert!(short.total_distance_m <= safe.total_distance_m + 1e-9);

        // The shortest path can never beat the safest one on weight.
        let g = p.graph();
        let shortest_weight: f64 =
            shortest.nodes.windows(2).map(|w| g.edge(w[0], w[1]).unwrap().weight).sum();
        assert!(safest.total_cost <= shortest_weight + 1e-9);
    }

    #[test]
    fn unknown_endpoint() {
        let err = planner().plan(LocationId(0), LocationId(404)).unwrap_err();
        assert!(matches!(err, PlannerError::Spatial(SpatialError::NodeNotFound(LocationId(404)))));
    }

    #[test]
    fn disconnected_plan_is_empty() {
        let mut locs = grid();
        locs.push(Location::new(LocationId(100), 1.0, 1.0, 0.5));
        let p = PlannerBuilder::new(test_config(), locs).incidents(incidents()).build().unwrap();
        let plan = p.plan(LocationId(0), LocationId(100)).unwrap();
        assert!(!plan.is_reachable());
        assert!(plan.shortest.is_none());
        assert!(plan.comparison.is_none());
    }

    #[test]
    fn plan_between_snaps_to_nearest() {
        let p = planner();
        let plan = p.plan_between(GeoPoint::new(0.00001, 0.0), GeoPoint::new(0.003, 0.00299)).unwrap();
        assert_eq!(plan.start, LocationId(0));
        assert_eq!(plan.end, LocationId(15));
        assert!(plan.is_reachable());
    }

    #[test]
    fn same_start_and_end() {
        let plan = planner().plan(LocationId(3), LocationId(3)).unwrap();
        assert_eq!(plan.safest.unwrap().nodes, vec![LocationId(3)]);
        assert_eq!(plan.comparison.unwrap().first.num_segments, 0);
    }

    #[test]
    fn default_distance_links_whole_grid() {
        let p = PlannerBuilder::new(RouteConfig::default(), grid()).build().unwrap();
        // 500 m reaches every other point of a 333 m grid.
        assert_eq!(p.graph().edge_count(), 16 * 15 / 2);
    }
}

// ── Query hour ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod query_hour {
    use sr_core::LocationId;

    use super::*;

    fn recent(p: &Planner, id: u32) -> f64 {
        p.features().iter().find(|f| f.location == LocationId(id)).unwrap().recent_incidents
    }

    #[test]
    fn moving_the_hour_refreshes_features() {
        let mut p = planner();
        assert_eq!(p.config().query_hour, 12);
        assert_eq!(recent(&p, 5), 0.0);

        p.set_query_hour(2).unwrap();
        assert_eq!(p.config().query_hour, 2);
        assert_eq!(recent(&p, 5), 8.0);
        assert_eq!(recent(&p, 0), 0.0);
        assert_eq!(p.scores().len(), 16);
        assert_eq!(p.graph().node_count(), 16);
    }

    #[test]
    fn invalid_hour_keeps_state() {
        let mut p = planner();
        let before = p.scores().to_vec();
        assert!(p.set_query_hour(24).is_err());
        assert_eq!(p.config().query_hour, 12);
        assert_eq!(p.scores(), &before[..]);
    }

    #[test]
    fn same_hour_is_a_no_op() {
        let mut p = planner();
        let before = p.scores().to_vec();
        p.set_query_hour(12).unwrap();
        assert_eq!(p.scores(), &before[..]);
    }
}

// ── Lattice topology ──────────────────────────────────────────────────────────

#[cfg(test)]
mod lattice {
    use sr_core::GeoPoint;
    use sr_spatial::LatticeSpec;

    use super::*;
    use crate::Topology;

    #[test]
    fn lattice_planner_routes_across_the_box() {
        let spec = LatticeSpec { rows: 7, cols: 7 };
        let p = PlannerBuilder::new(test_config(), grid())
            .incidents(incidents())
            .topology(Topology::Lattice(spec))
            .build()
            .unwrap();
        assert_eq!(p.graph().node_count(), 49);
        // Scores stay per location; the grid carries interpolated risk.
        assert_eq!(p.scores().len(), 16);
        assert!(p.graph().node_risk.iter().all(|r| (0.0..=1.0).contains(r)));

        let plan = p.plan_between(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.003, 0.003)).unwrap();
        // Grid ids start after the largest ingested id (15).
        assert_eq!(plan.start, LocationId(16));
        assert_eq!(plan.end, LocationId(16 + 48));
        assert!(plan.is_reachable());
    }

    #[test]
    fn grid_ids_never_collide_with_location_ids() {
        let spec = LatticeSpec { rows: 3, cols: 3 };
        let p = PlannerBuilder::new(test_config(), grid())
            .incidents(incidents())
            .topology(Topology::Lattice(spec))
            .build()
            .unwrap();
        assert!(p.graph().node_location.iter().all(|id| id.0 >= 16));
        assert!(p.locations().iter().all(|l| !p.graph().contains(l.id)));
        assert_eq!(p.score_of(LocationId(16)), None);
        assert!(p.plan(LocationId(0), LocationId(1)).is_err());
    }
}
