//! Solver output and its check against the declared model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::instance::RoutingInstance;
use crate::model::ModelConfig;
use crate::visits::{VisitKind, DEPOT};

/// A visited node with the cumulative value of every dimension on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStop {
    pub visit: usize,
    /// Load still on board.
    pub load: i64,
    /// Minute of day service starts.
    pub time: i64,
    /// Pickups made so far.
    pub pickups: i64,
}

/// One vehicle's route, depot start and depot end included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRoute {
    pub vehicle: usize,
    pub stops: Vec<RouteStop>,
}

impl VehicleRoute {
    pub fn is_used(&self) -> bool {
        self.stops.iter().any(|stop| stop.visit != DEPOT)
    }

    /// Visit indices served, depot excluded.
    pub fn visits(&self) -> impl Iterator<Item = usize> + '_ {
        self.stops
            .iter()
            .map(|stop| stop.visit)
            .filter(|&visit| visit != DEPOT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub routes: Vec<VehicleRoute>,
}

impl Assignment {
    pub fn is_active(&self, visit: usize) -> bool {
        self.routes.iter().any(|route| route.visits().any(|v| v == visit))
    }

    /// Activity flag per visit index. The depot is always active.
    pub fn active_flags(&self, visits: usize) -> Vec<bool> {
        let mut flags = vec![false; visits];
        if let Some(depot) = flags.first_mut() {
            *depot = true;
        }
        for visit in self.routes.iter().flat_map(VehicleRoute::visits) {
            if let Some(flag) = flags.get_mut(visit) {
                *flag = true;
            }
        }
        flags
    }
}

/// Terminal state of a planning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved(Assignment),
    NoSolution,
}

impl SolveOutcome {
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            SolveOutcome::Solved(assignment) => Some(assignment),
            SolveOutcome::NoSolution => None,
        }
    }
}

/// A way in which an assignment breaks the declared model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("vehicle {vehicle} is not in the fleet")]
    UnknownVehicle { vehicle: usize },

    #[error("visit {visit} does not exist")]
    UnknownVisit { visit: usize },

    #[error("route of vehicle {vehicle} does not start and end at the depot")]
    RouteNotAtDepot { vehicle: usize },

    #[error("vehicle {vehicle} has more than one route")]
    DuplicateVehicle { vehicle: usize },

    #[error("route of vehicle {vehicle} returns to the depot at stop {position}")]
    DepotMidRoute { vehicle: usize, position: usize },

    #[error("visit {visit} is served more than once")]
    VisitedTwice { visit: usize },

    #[error("store {location} is served through {} window variants", .active.len())]
    GroupOverServed { location: String, active: Vec<usize> },

    #[error("vehicle {vehicle} starts with load {found}, expected {expected}")]
    CapacityStart {
        vehicle: usize,
        expected: i64,
        found: i64,
    },

    #[error("load at visit {visit} on vehicle {vehicle} is {found}, expected {expected}")]
    CapacityStep {
        vehicle: usize,
        visit: usize,
        expected: i64,
        found: i64,
    },

    #[error("load {load} at visit {visit} on vehicle {vehicle} is outside [0, {capacity}]")]
    CapacityBounds {
        vehicle: usize,
        visit: usize,
        load: i64,
        capacity: i64,
    },

    #[error("time {time} at visit {visit} on vehicle {vehicle} is outside [{start}, {end}]")]
    OutsideWindow {
        vehicle: usize,
        visit: usize,
        time: i64,
        start: i64,
        end: i64,
    },

    #[error("arrival at visit {visit} on vehicle {vehicle} waits {wait} min, allowed [0, {slack}]")]
    TimeStep {
        vehicle: usize,
        visit: usize,
        wait: i64,
        slack: i64,
    },

    #[error("vehicle {vehicle} spans {span} min, cap is {cap}")]
    SpanExceeded { vehicle: usize, span: i64, cap: i64 },

    #[error("pickup counter at visit {visit} on vehicle {vehicle} is {found}, expected {expected}")]
    PickupCounter {
        vehicle: usize,
        visit: usize,
        expected: i64,
        found: i64,
    },

    #[error("delivery {visit} on vehicle {vehicle} comes after a pickup")]
    PickupBeforeDelivery { vehicle: usize, visit: usize },
}

/// Check an assignment against everything the model declares.
pub fn verify(instance: &RoutingInstance, config: &ModelConfig, assignment: &Assignment) -> Result<()> {
    let mut served = HashSet::new();
    let mut vehicles = HashSet::new();

    for route in &assignment.routes {
        if !vehicles.insert(route.vehicle) {
            return Err(Violation::DuplicateVehicle {
                vehicle: route.vehicle,
            }
            .into());
        }
        verify_route(instance, config, route)?;
        for visit in route.visits() {
            if !served.insert(visit) {
                return Err(Violation::VisitedTwice { visit }.into());
            }
        }
    }

    for group in instance.graph().client_groups() {
        let active: Vec<usize> = group
            .iter()
            .copied()
            .filter(|visit| served.contains(visit))
            .collect();
        if active.len() > 1 {
            return Err(Violation::GroupOverServed {
                location: instance.visit(group[0]).location_id.clone(),
                active,
            }
            .into());
        }
    }

    Ok(())
}

fn verify_route(instance: &RoutingInstance, config: &ModelConfig, route: &VehicleRoute) -> Result<()> {
    let vehicle = route.vehicle;
    let Some(&capacity) = instance.fleet().capacities.get(vehicle) else {
        return Err(Violation::UnknownVehicle { vehicle }.into());
    };
    let (Some(first), Some(last)) = (route.stops.first(), route.stops.last()) else {
        return Ok(());
    };
    if first.visit != DEPOT || last.visit != DEPOT || route.stops.len() < 2 {
        return Err(Violation::RouteNotAtDepot { vehicle }.into());
    }
    let inner = &route.stops[1..route.stops.len() - 1];
    if let Some(position) = inner.iter().position(|stop| stop.visit == DEPOT) {
        return Err(Violation::DepotMidRoute {
            vehicle,
            position: position + 1,
        }
        .into());
    }
    if let Some(stop) = route.stops.iter().find(|stop| stop.visit >= instance.len()) {
        return Err(Violation::UnknownVisit { visit: stop.visit }.into());
    }

    if first.load != capacity {
        return Err(Violation::CapacityStart {
            vehicle,
            expected: capacity,
            found: first.load,
        }
        .into());
    }
    if first.pickups != 0 {
        return Err(Violation::PickupCounter {
            vehicle,
            visit: DEPOT,
            expected: 0,
            found: first.pickups,
        }
        .into());
    }

    for stop in &route.stops {
        check_stop(instance, config, vehicle, capacity, stop)?;
    }

    let service = instance.service_times();
    for pair in route.stops.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let visit = instance.visit(next.visit);

        let expected = prev.load + visit.demand;
        if next.load != expected {
            return Err(Violation::CapacityStep {
                vehicle,
                visit: next.visit,
                expected,
                found: next.load,
            }
            .into());
        }

        let transit = instance
            .time()
            .value(prev.visit, next.visit)
            .saturating_add(service[prev.visit]);
        let wait = next.time - prev.time - transit;
        if wait < 0 || wait > config.time_slack {
            return Err(Violation::TimeStep {
                vehicle,
                visit: next.visit,
                wait,
                slack: config.time_slack,
            }
            .into());
        }

        let expected = prev.pickups + i64::from(visit.kind == VisitKind::Pickup);
        if next.pickups != expected {
            return Err(Violation::PickupCounter {
                vehicle,
                visit: next.visit,
                expected,
                found: next.pickups,
            }
            .into());
        }
    }

    let span = last.time - first.time;
    if span > config.span_cap {
        return Err(Violation::SpanExceeded {
            vehicle,
            span,
            cap: config.span_cap,
        }
        .into());
    }

    Ok(())
}

fn check_stop(
    instance: &RoutingInstance,
    config: &ModelConfig,
    vehicle: usize,
    capacity: i64,
    stop: &RouteStop,
) -> Result<()> {
    let visit = instance.visit(stop.visit);

    if stop.load < 0 || stop.load > capacity {
        return Err(Violation::CapacityBounds {
            vehicle,
            visit: stop.visit,
            load: stop.load,
            capacity,
        }
        .into());
    }

    let (start, end) = if visit.is_depot() {
        (0, config.horizon)
    } else {
        (visit.window.start, visit.window.end.min(config.horizon))
    };
    if stop.time < start || stop.time > end {
        return Err(Violation::OutsideWindow {
            vehicle,
            visit: stop.visit,
            time: stop.time,
            start,
            end,
        }
        .into());
    }

    if visit.kind == VisitKind::Client && stop.pickups != 0 {
        return Err(Violation::PickupBeforeDelivery {
            vehicle,
            visit: stop.visit,
        }
        .into());
    }

    Ok(())
}
