//! Constraint model assembly against a [`RoutingEngine`].
//!
//! Declares the arc cost, three cumulative dimensions (capacity, time and the
//! pickup sequence counter) and the optional-visit disjunctions, then runs
//! the engine and checks what it returns against the declared model.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assignment::{verify, Assignment, SolveOutcome};
use crate::error::{Error, Result};
use crate::instance::RoutingInstance;
use crate::traits::{DimensionId, DimensionSpec, RoutingEngine, Transit, TransitId};
use crate::visits::{VisitKind, DEPOT};

pub const CAPACITY: &str = "Capacity";
pub const TIME: &str = "Time";
pub const PICKUP_SEQUENCE: &str = "PickupSequence";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FirstSolutionStrategy {
    #[default]
    PathMostConstrainedArc,
    ParallelCheapestInsertion,
    PathCheapestArc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocalSearchMetaheuristic {
    #[default]
    GuidedLocalSearch,
    SimulatedAnnealing,
    TabuSearch,
    GreedyDescent,
}

/// Search settings handed to the engine as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    pub time_limit: Duration,
    pub first_solution: FirstSolutionStrategy,
    pub metaheuristic: LocalSearchMetaheuristic,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(75),
            first_solution: FirstSolutionStrategy::default(),
            metaheuristic: LocalSearchMetaheuristic::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Waiting allowed between consecutive stops, in minutes.
    pub time_slack: i64,
    /// Largest value of the time dimension, in minutes.
    pub horizon: i64,
    /// Working-day cap on each vehicle's elapsed time, in minutes.
    pub span_cap: i64,
    /// Cost of leaving a visit (or a whole store group) unserved.
    pub drop_penalty: i64,
    pub search: SearchParameters,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            time_slack: 60,
            horizon: 1440,
            span_cap: 720,
            drop_penalty: 10_000_000,
            search: SearchParameters::default(),
        }
    }
}

/// What was declared with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelHandles {
    pub arc_cost: TransitId,
    pub capacity: DimensionId,
    pub time: DimensionId,
    pub pickup_sequence: DimensionId,
}

/// Declare the full model for `instance` with `engine`.
pub fn assemble<E: RoutingEngine>(
    instance: &RoutingInstance,
    config: &ModelConfig,
    engine: &mut E,
) -> Result<ModelHandles> {
    check_horizon(instance, config)?;

    let nodes = instance.len();
    let fleet = instance.fleet();
    engine.declare_graph(nodes, fleet.len(), DEPOT)?;

    let arc_cost = engine.register_transit(Transit::Arc(instance.distance().to_rows()))?;
    engine.set_arc_cost(arc_cost)?;

    let capacity = declare_capacity(instance, engine)?;
    let time = declare_time(instance, config, engine)?;
    let pickup_sequence = declare_pickup_sequence(instance, engine)?;

    let groups = instance.disjunction_groups();
    for group in &groups {
        engine.add_disjunction(group, config.drop_penalty, 1)?;
    }
    debug!(groups = groups.len(), "disjunctions declared");

    Ok(ModelHandles {
        arc_cost,
        capacity,
        time,
        pickup_sequence,
    })
}

/// Every window must open within the horizon, or its cumul range is empty.
fn check_horizon(instance: &RoutingInstance, config: &ModelConfig) -> Result<()> {
    let late = instance
        .visits()
        .iter()
        .enumerate()
        .find(|(_, visit)| !visit.is_depot() && visit.window.start > config.horizon);

    match late {
        Some((index, visit)) => Err(Error::WindowPastHorizon {
            visit: index,
            location: visit.location_id.clone(),
            start: visit.window.start,
            horizon: config.horizon,
        }),
        None => Ok(()),
    }
}

/// Vehicles leave full and unload along the route.
fn declare_capacity<E: RoutingEngine>(
    instance: &RoutingInstance,
    engine: &mut E,
) -> Result<DimensionId> {
    let capacities = instance.fleet().capacities.clone();
    let transit = engine.register_transit(Transit::Destination(instance.demands()))?;
    let dimension = engine.add_dimension(DimensionSpec {
        name: CAPACITY.to_string(),
        transit,
        slack_max: 0,
        capacities: capacities.clone(),
        fix_start_cumul_to_zero: false,
    })?;

    for (vehicle, &capacity) in capacities.iter().enumerate() {
        engine.set_start_cumul(dimension, vehicle, capacity)?;
    }
    Ok(dimension)
}

/// Travel plus service at the origin, bounded by windows and the span cap.
fn declare_time<E: RoutingEngine>(
    instance: &RoutingInstance,
    config: &ModelConfig,
    engine: &mut E,
) -> Result<DimensionId> {
    let time = instance.time();
    let service = instance.service_times();
    let transit: Vec<Vec<i64>> = (0..instance.len())
        .map(|from| {
            (0..instance.len())
                .map(|to| time.value(from, to).saturating_add(service[from]))
                .collect()
        })
        .collect();

    let vehicles = instance.fleet().len();
    let transit = engine.register_transit(Transit::Arc(transit))?;
    let dimension = engine.add_dimension(DimensionSpec {
        name: TIME.to_string(),
        transit,
        slack_max: config.time_slack,
        capacities: vec![config.horizon; vehicles],
        fix_start_cumul_to_zero: false,
    })?;

    for vehicle in 0..vehicles {
        engine.set_span_upper_bound(dimension, vehicle, config.span_cap)?;
    }

    for (node, visit) in instance.visits().iter().enumerate() {
        if visit.is_depot() {
            engine.set_cumul_range(dimension, node, 0, config.horizon)?;
        } else if visit.window.is_valid() {
            engine.set_cumul_range(
                dimension,
                node,
                visit.window.start,
                visit.window.end.min(config.horizon),
            )?;
        }
    }
    Ok(dimension)
}

/// Counts pickups; deliveries must see a zero count.
fn declare_pickup_sequence<E: RoutingEngine>(
    instance: &RoutingInstance,
    engine: &mut E,
) -> Result<DimensionId> {
    let increments: Vec<i64> = instance
        .visits()
        .iter()
        .map(|visit| i64::from(visit.kind == VisitKind::Pickup))
        .collect();
    let pickups: i64 = increments.iter().sum();

    let transit = engine.register_transit(Transit::Destination(increments))?;
    let dimension = engine.add_dimension(DimensionSpec {
        name: PICKUP_SEQUENCE.to_string(),
        transit,
        slack_max: 0,
        capacities: vec![pickups + 1; instance.fleet().len()],
        fix_start_cumul_to_zero: true,
    })?;

    for (node, visit) in instance.visits().iter().enumerate() {
        if visit.kind == VisitKind::Client {
            engine.set_cumul_range(dimension, node, 0, 0)?;
        }
    }
    Ok(dimension)
}

/// Assemble, search and check the returned assignment.
pub fn solve<E: RoutingEngine>(
    instance: &RoutingInstance,
    config: &ModelConfig,
    engine: &mut E,
) -> Result<SolveOutcome> {
    assemble(instance, config, engine)?;

    let Some(assignment) = engine.solve(&config.search)? else {
        warn!(
            time_limit_secs = config.search.time_limit.as_secs(),
            "no solution found"
        );
        return Ok(SolveOutcome::NoSolution);
    };

    verify(instance, config, &assignment)?;
    log_assignment(instance, &assignment);
    Ok(SolveOutcome::Solved(assignment))
}

fn log_assignment(instance: &RoutingInstance, assignment: &Assignment) {
    let active = assignment.active_flags(instance.len());
    let skipped = active.iter().skip(1).filter(|&&on| !on).count();
    info!(
        vehicles_used = assignment.routes.iter().filter(|r| r.is_used()).count(),
        visited = instance.len() - 1 - skipped,
        skipped,
        "solution found"
    );
}
