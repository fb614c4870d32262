//! Test fixtures for vrp-instance.
//!
//! Provides:
//! - Real Galician warehouse/store locations
//! - A builder for raw warehouse records
//! - A routing engine double that records declarations and replays a plan
//! - A route simulator producing cumulative values the way an engine would

#![allow(dead_code)]

pub mod galicia_locations;

pub use galicia_locations::*;

use vrp_instance::assignment::{Assignment, RouteStop, VehicleRoute};
use vrp_instance::instance::RoutingInstance;
use vrp_instance::model::SearchParameters;
use vrp_instance::records::{
    DemandRecord, EdgeRecord, PhysicalLocation, RawRecords, ServiceTimeRecord, WindowRecord,
};
use vrp_instance::traits::{DimensionId, DimensionSpec, RoutingEngine, Transit, TransitId};
use vrp_instance::visits::{VisitKind, DEPOT as DEPOT_VISIT};
use vrp_instance::{Error, Result};

pub const DEPOT_ID: &str = "A00010";
pub const DAY: i64 = 1_694_736_000;

// ============================================================================
// Raw records
// ============================================================================

/// Builder for raw records with a depot already in place.
#[derive(Debug, Clone)]
pub struct TestRecords {
    records: RawRecords,
}

impl TestRecords {
    pub fn new() -> Self {
        Self {
            records: RawRecords {
                locations: vec![PhysicalLocation::new(DEPOT_ID, 42.8782, -8.5448)],
                ..RawRecords::default()
            },
        }
    }

    pub fn location(mut self, id: &str, lat: f64, lng: f64) -> Self {
        self.records.locations.push(PhysicalLocation::new(id, lat, lng));
        self
    }

    /// A store location with its load for [`DAY`].
    pub fn store(self, id: &str, load: f64) -> Self {
        let n = self.records.locations.len() as f64;
        self.location(id, 42.0 + n * 0.01, -8.0 - n * 0.01).demand(id, load)
    }

    pub fn warehouse(self, id: &str) -> Self {
        let n = self.records.locations.len() as f64;
        self.location(id, 43.0 + n * 0.01, -8.2)
    }

    pub fn demand(mut self, client: &str, load: f64) -> Self {
        self.records.demands.push(DemandRecord {
            client_id: client.to_string(),
            day: DAY,
            load,
        });
        self
    }

    pub fn demand_on(mut self, client: &str, day: i64, load: f64) -> Self {
        self.records.demands.push(DemandRecord {
            client_id: client.to_string(),
            day,
            load,
        });
        self
    }

    pub fn window(self, client: &str, start: &str, end: &str) -> Self {
        self.window_for(client, "PMG", start, end)
    }

    pub fn window_for(mut self, client: &str, process: &str, start: &str, end: &str) -> Self {
        self.records.windows.push(WindowRecord {
            client_id: client.to_string(),
            process: process.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        });
        self
    }

    pub fn service(mut self, client: &str, minutes: f64) -> Self {
        self.records.service_times.push(ServiceTimeRecord {
            client_id: client.to_string(),
            minutes: Some(minutes),
        });
        self
    }

    pub fn edge(mut self, from: &str, to: &str, km: f64, minutes: f64) -> Self {
        self.records.edges.push(EdgeRecord::new(from, to, km, minutes));
        self
    }

    pub fn both_ways(self, a: &str, b: &str, km: f64, minutes: f64) -> Self {
        self.edge(a, b, km, minutes).edge(b, a, km, minutes)
    }

    pub fn incompatible(mut self, from: &str, to: &str, km: f64, minutes: f64) -> Self {
        self.records
            .edges
            .push(EdgeRecord::new(from, to, km, minutes).incompatible());
        self
    }

    pub fn build(self) -> RawRecords {
        self.records
    }
}

/// Mixed network used across suites.
///
/// Visit indices, in build order:
/// 0 depot, 1..=3 C00001 (three windows), 4 C00002 (closed window, 40 MCE),
/// 5 C00003 (no window), 6 A00031 pickup.
pub fn mixed_network() -> RawRecords {
    TestRecords::new()
        .store("C00001", 10.0)
        .window("C00001", "08:00", "10:00")
        .window("C00001", "14:00", "16:00")
        .window("C00001", "18:00", "20:00")
        .service("C00001", 15.0)
        .store("C00002", 40.0)
        .window("C00002", "00:00", "00:00")
        .store("C00003", 5.0)
        .service("C00003", 10.0)
        .warehouse("A00031")
        .both_ways(DEPOT_ID, "C00001", 30.0, 30.0)
        .both_ways(DEPOT_ID, "C00002", 50.0, 45.0)
        .both_ways(DEPOT_ID, "C00003", 20.0, 20.0)
        .both_ways(DEPOT_ID, "A00031", 15.0, 15.0)
        .both_ways("C00001", "C00003", 10.0, 12.0)
        .both_ways("C00003", "A00031", 8.0, 9.0)
        .both_ways("C00001", "A00031", 25.0, 25.0)
        .build()
}

// ============================================================================
// Routing engine double
// ============================================================================

/// Records every declaration and answers `solve` with a prepared plan.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub nodes: usize,
    pub vehicles: usize,
    pub depot: usize,
    pub transits: Vec<Transit>,
    pub arc_cost: Option<TransitId>,
    pub dimensions: Vec<DimensionSpec>,
    pub start_cumuls: Vec<(DimensionId, usize, i64)>,
    pub ranges: Vec<(DimensionId, usize, i64, i64)>,
    pub spans: Vec<(DimensionId, usize, i64)>,
    pub disjunctions: Vec<(Vec<usize>, i64, usize)>,
    pub solution: Option<Assignment>,
    pub searched_with: Option<SearchParameters>,
    /// Accept fewer nodes than declared, to exercise engine-side rejection.
    pub node_limit: Option<usize>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replaying(solution: Assignment) -> Self {
        Self {
            solution: Some(solution),
            ..Self::default()
        }
    }

    pub fn dimension(&self, name: &str) -> (DimensionId, &DimensionSpec) {
        let index = self
            .dimensions
            .iter()
            .position(|d| d.name == name)
            .unwrap_or_else(|| panic!("dimension {} not declared", name));
        (DimensionId(index), &self.dimensions[index])
    }

    pub fn transit(&self, id: TransitId) -> &Transit {
        &self.transits[id.0]
    }

    pub fn range(&self, dimension: DimensionId, node: usize) -> Option<(i64, i64)> {
        self.ranges
            .iter()
            .rev()
            .find(|(d, n, _, _)| *d == dimension && *n == node)
            .map(|&(_, _, min, max)| (min, max))
    }

    fn check_node(&self, node: usize) -> Result<()> {
        if node >= self.nodes {
            return Err(Error::Engine(format!("node {} out of range", node)));
        }
        Ok(())
    }
}

impl RoutingEngine for RecordingEngine {
    fn declare_graph(&mut self, nodes: usize, vehicles: usize, depot: usize) -> Result<()> {
        self.nodes = self.node_limit.map_or(nodes, |limit| limit.min(nodes));
        self.vehicles = vehicles;
        self.depot = depot;
        Ok(())
    }

    fn register_transit(&mut self, transit: Transit) -> Result<TransitId> {
        self.transits.push(transit);
        Ok(TransitId(self.transits.len() - 1))
    }

    fn set_arc_cost(&mut self, transit: TransitId) -> Result<()> {
        self.arc_cost = Some(transit);
        Ok(())
    }

    fn add_dimension(&mut self, dimension: DimensionSpec) -> Result<DimensionId> {
        if dimension.capacities.len() != self.vehicles {
            return Err(Error::Engine("one capacity per vehicle expected".to_string()));
        }
        self.dimensions.push(dimension);
        Ok(DimensionId(self.dimensions.len() - 1))
    }

    fn set_start_cumul(&mut self, dimension: DimensionId, vehicle: usize, value: i64) -> Result<()> {
        self.start_cumuls.push((dimension, vehicle, value));
        Ok(())
    }

    fn set_cumul_range(&mut self, dimension: DimensionId, node: usize, min: i64, max: i64) -> Result<()> {
        self.check_node(node)?;
        self.ranges.push((dimension, node, min, max));
        Ok(())
    }

    fn set_span_upper_bound(&mut self, dimension: DimensionId, vehicle: usize, bound: i64) -> Result<()> {
        self.spans.push((dimension, vehicle, bound));
        Ok(())
    }

    fn add_disjunction(&mut self, nodes: &[usize], penalty: i64, max_active: usize) -> Result<()> {
        for &node in nodes {
            self.check_node(node)?;
        }
        if nodes.contains(&self.depot) {
            return Err(Error::Engine("depot cannot be optional".to_string()));
        }
        self.disjunctions.push((nodes.to_vec(), penalty, max_active));
        Ok(())
    }

    fn solve(&mut self, parameters: &SearchParameters) -> Result<Option<Assignment>> {
        self.searched_with = Some(parameters.clone());
        Ok(self.solution.take())
    }
}

// ============================================================================
// Route simulation
// ============================================================================

/// Cumulative values for a vehicle serving `visits` in order, leaving the
/// depot at `departure` and waiting for windows to open.
pub fn simulate_route(
    instance: &RoutingInstance,
    vehicle: usize,
    departure: i64,
    visits: &[usize],
) -> VehicleRoute {
    let mut stops = vec![RouteStop {
        visit: DEPOT_VISIT,
        load: instance.fleet().capacities[vehicle],
        time: departure,
        pickups: 0,
    }];

    for &visit in visits.iter().chain(std::iter::once(&DEPOT_VISIT)) {
        let prev = *stops.last().unwrap();
        let node = instance.visit(visit);
        let arrival = prev.time
            + instance.time().value(prev.visit, visit)
            + instance.visit(prev.visit).service_minutes;
        stops.push(RouteStop {
            visit,
            load: prev.load + node.demand,
            time: arrival.max(node.window.start),
            pickups: prev.pickups + i64::from(node.kind == VisitKind::Pickup),
        });
    }

    VehicleRoute { vehicle, stops }
}

/// Plan where every vehicle but the listed routes stays at the depot.
pub fn plan(instance: &RoutingInstance, routes: Vec<VehicleRoute>) -> Assignment {
    let mut all: Vec<VehicleRoute> = (0..instance.fleet().len())
        .map(|vehicle| VehicleRoute {
            vehicle,
            stops: Vec::new(),
        })
        .collect();
    for route in routes {
        let vehicle = route.vehicle;
        all[vehicle] = route;
    }
    Assignment { routes: all }
}
