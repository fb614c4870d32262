//! Plain records describing a plan, for maps, spreadsheets and console output.
//!
//! Nothing here renders; collaborators read these structures.

use serde::{Deserialize, Serialize};

use crate::assignment::{Assignment, SolveOutcome, VehicleRoute};
use crate::diagnose::{diagnose, DiscardReason};
use crate::instance::RoutingInstance;
use crate::visits::VisitKind;
use crate::windows::TimeWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopReport {
    pub visit: usize,
    pub location_id: String,
    pub kind: VisitKind,
    pub process: String,
    pub latitude: f64,
    pub longitude: f64,
    pub window: TimeWindow,
    /// Minute service starts.
    pub arrival: i64,
    /// Minute the vehicle leaves, after service.
    pub departure: i64,
    /// Minutes spent waiting before service.
    pub wait: i64,
    /// Load on board on arrival, in MCE.
    pub load: i64,
    /// Quantity dropped or collected here.
    pub handled: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    pub vehicle: usize,
    pub stops: Vec<StopReport>,
    /// Kilometers along the route.
    pub distance: i64,
    /// Minutes from depot departure to return.
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnvisitedReport {
    pub visit: usize,
    pub location_id: String,
    pub process: String,
    pub load: i64,
    pub window: TimeWindow,
    pub reason: DiscardReason,
}

/// Requested against delivered load for one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadAudit {
    pub location_id: String,
    pub requested: i64,
    pub delivered: i64,
    pub shortfall: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub vehicles_used: usize,
    pub load_delivered: i64,
    pub load_requested: i64,
    pub total_distance: i64,
    pub total_duration: i64,
    pub visits_served: usize,
    pub visits_unserved: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub solved: bool,
    pub routes: Vec<RouteReport>,
    pub unvisited: Vec<UnvisitedReport>,
    /// Per store, largest shortfall first.
    pub audit: Vec<LoadAudit>,
    pub summary: PlanSummary,
}

impl PlanReport {
    pub fn from_outcome(instance: &RoutingInstance, outcome: &SolveOutcome) -> Self {
        match outcome {
            SolveOutcome::Solved(assignment) => Self::build(instance, assignment),
            SolveOutcome::NoSolution => Self {
                solved: false,
                ..Self::build(instance, &Assignment::default())
            },
        }
    }

    pub fn build(instance: &RoutingInstance, assignment: &Assignment) -> Self {
        let active = assignment.active_flags(instance.len());

        let routes: Vec<RouteReport> = assignment
            .routes
            .iter()
            .filter(|route| route.is_used())
            .map(|route| route_report(instance, route))
            .collect();

        let unvisited: Vec<UnvisitedReport> = diagnose(instance, &active)
            .into_iter()
            .map(|diagnosis| {
                let visit = instance.visit(diagnosis.visit);
                UnvisitedReport {
                    visit: diagnosis.visit,
                    location_id: diagnosis.location_id,
                    process: visit.process.clone(),
                    load: visit.load(),
                    window: visit.window,
                    reason: diagnosis.reason,
                }
            })
            .collect();

        let audit = load_audit(instance, &active);

        let summary = PlanSummary {
            vehicles_used: routes.len(),
            load_delivered: audit.iter().map(|a| a.delivered).sum(),
            load_requested: audit.iter().map(|a| a.requested).sum(),
            total_distance: routes.iter().map(|r| r.distance).sum(),
            total_duration: routes.iter().map(|r| r.duration).sum(),
            visits_served: active.iter().skip(1).filter(|&&on| on).count(),
            visits_unserved: unvisited.len(),
        };

        Self {
            solved: true,
            routes,
            unvisited,
            audit,
            summary,
        }
    }
}

fn route_report(instance: &RoutingInstance, route: &VehicleRoute) -> RouteReport {
    let mut stops = Vec::with_capacity(route.stops.len());
    let mut distance = 0;
    let mut previous: Option<(usize, i64)> = None;

    for stop in &route.stops {
        let visit = instance.visit(stop.visit);
        let location = instance.graph().location_of(stop.visit);

        let wait = match previous {
            None => 0,
            Some((from, departed)) => {
                distance += instance.distance().value(from, stop.visit);
                let reached = departed + instance.time().value(from, stop.visit);
                (stop.time - reached).max(0)
            }
        };

        let departure = stop.time + visit.service_minutes;
        stops.push(StopReport {
            visit: stop.visit,
            location_id: visit.location_id.clone(),
            kind: visit.kind,
            process: visit.process.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            window: visit.window,
            arrival: stop.time,
            departure,
            wait,
            load: stop.load,
            handled: visit.load(),
        });
        previous = Some((stop.visit, departure));
    }

    let duration = match (route.stops.first(), route.stops.last()) {
        (Some(first), Some(last)) => last.time - first.time,
        _ => 0,
    };

    RouteReport {
        vehicle: route.vehicle,
        stops,
        distance,
        duration,
    }
}

/// A store counts as delivered in full when any of its window variants is served.
fn load_audit(instance: &RoutingInstance, active: &[bool]) -> Vec<LoadAudit> {
    let mut audit: Vec<LoadAudit> = instance
        .graph()
        .client_groups()
        .into_iter()
        .map(|group| {
            let visit = instance.visit(group[0]);
            let requested = visit.load();
            let delivered = if group.iter().any(|&v| active[v]) {
                requested
            } else {
                0
            };
            LoadAudit {
                location_id: visit.location_id.clone(),
                requested,
                delivered,
                shortfall: requested - delivered,
            }
        })
        .collect();

    audit.sort_by(|a, b| {
        b.shortfall
            .cmp(&a.shortfall)
            .then_with(|| a.location_id.cmp(&b.location_id))
    });
    audit
}

/// Served visits of a route, depot excluded, as location ids.
pub fn route_location_ids(instance: &RoutingInstance, route: &VehicleRoute) -> Vec<String> {
    route
        .visits()
        .map(|visit| instance.visit(visit).location_id.clone())
        .collect()
}
