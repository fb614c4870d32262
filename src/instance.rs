//! Solver-ready routing instance.
//!
//! Runs the compilation stages in order (window consolidation, visit graph,
//! matrices) and bundles the results with the fleet. The instance is
//! read-only once built.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::matrix::{compile_matrices, CostMatrix, Matrices};
use crate::records::{client_location_id, DemandRecord, RawRecords, ServiceTimeRecord};
use crate::traits::RecordSource;
use crate::visits::{build_visit_graph, GraphInputs, PickupDemand, Visit, VisitGraph, VisitKind};
use crate::windows::{consolidate_records, TimeWindow, WindowFilter};

/// Vehicles available for a planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    /// Capacity of each vehicle in MCE, indexed by vehicle.
    pub capacities: Vec<i64>,
}

impl Fleet {
    pub fn uniform(vehicles: usize, capacity: i64) -> Self {
        Self {
            capacities: vec![capacity; vehicles],
        }
    }

    pub fn len(&self) -> usize {
        self.capacities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capacities.is_empty()
    }

    pub fn max_capacity(&self) -> i64 {
        self.capacities.iter().copied().max().unwrap_or(0)
    }
}

impl Default for Fleet {
    fn default() -> Self {
        Self::uniform(150, 33)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Location the vehicles depart from and return to.
    pub depot_id: String,
    /// Planning day (unix timestamp, date only). `None` keeps every demand row.
    pub day: Option<i64>,
    /// Only consolidate window records of this process.
    pub window_process: Option<String>,
    /// Read raw `00:00 - 00:00` windows as open all day instead of closed.
    pub open_unset_windows: bool,
    /// Process tag of clients that have no window records.
    pub fallback_process: String,
    pub pickup_demand: PickupDemand,
    pub fleet: Fleet,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            depot_id: "A00010".to_string(),
            day: None,
            window_process: None,
            open_unset_windows: false,
            fallback_process: "ASSUMED".to_string(),
            pickup_demand: PickupDemand::Zero,
            fleet: Fleet::default(),
        }
    }
}

/// Sum demand rows per client location for the planning day.
pub fn aggregate_demand(records: &[DemandRecord], day: Option<i64>) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for record in records {
        if day.is_some_and(|day| day != record.day) {
            continue;
        }
        *totals
            .entry(client_location_id(&record.client_id))
            .or_insert(0.0) += record.load;
    }
    totals
}

/// Unloading minutes per client location; missing values count as zero.
pub fn service_time_lookup(records: &[ServiceTimeRecord]) -> HashMap<String, i64> {
    records
        .iter()
        .map(|record| {
            let minutes = record
                .minutes
                .filter(|m| m.is_finite() && *m > 0.0)
                .map(|m| m as i64)
                .unwrap_or(0);
            (client_location_id(&record.client_id), minutes)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct RoutingInstance {
    graph: VisitGraph,
    matrices: Matrices,
    fleet: Fleet,
}

impl RoutingInstance {
    /// Compile raw records into an instance.
    pub fn build(records: &RawRecords, config: &InstanceConfig) -> Result<Self> {
        if config.fleet.is_empty() {
            return Err(Error::EmptyFleet);
        }
        if let PickupDemand::Fixed(quantity) = config.pickup_demand {
            if quantity < 0 {
                return Err(Error::NegativePickupDemand { quantity });
            }
        }
        if records.edges.is_empty() {
            return Err(Error::EmptyEdgeTable);
        }

        let windows = consolidate_records(
            &records.windows,
            &WindowFilter {
                process: config.window_process.as_deref(),
                open_unset: config.open_unset_windows,
            },
        );
        let demands = aggregate_demand(&records.demands, config.day);
        let service_times = service_time_lookup(&records.service_times);

        let graph = build_visit_graph(&GraphInputs {
            locations: &records.locations,
            demands: &demands,
            windows: &windows,
            service_times: &service_times,
            depot_id: &config.depot_id,
            fallback_process: &config.fallback_process,
            pickup_demand: config.pickup_demand,
        })?;
        let matrices = compile_matrices(&graph, &records.edges)?;

        let instance = Self {
            graph,
            matrices,
            fleet: config.fleet.clone(),
        };
        info!(
            visits = instance.len(),
            clients = instance.graph.indices_of(VisitKind::Client).len(),
            stores = instance.graph.client_groups().len(),
            pickups = instance.graph.indices_of(VisitKind::Pickup).len(),
            vehicles = instance.fleet.len(),
            penalty = instance.matrices.penalty(),
            "routing instance built"
        );

        Ok(instance)
    }

    /// Pull every table from a record source and compile it.
    pub fn from_source<S: RecordSource>(source: &S, config: &InstanceConfig) -> Result<Self> {
        let records = RawRecords {
            locations: source.locations()?,
            edges: source.edges()?,
            demands: source.demands(config.day)?,
            windows: source.windows()?,
            service_times: source.service_times()?,
        };
        Self::build(&records, config)
    }

    pub fn graph(&self) -> &VisitGraph {
        &self.graph
    }

    pub fn visits(&self) -> &[Visit] {
        self.graph.visits()
    }

    pub fn visit(&self, index: usize) -> &Visit {
        self.graph.visit(index)
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn distance(&self) -> &CostMatrix {
        &self.matrices.distance
    }

    pub fn time(&self) -> &CostMatrix {
        &self.matrices.time
    }

    pub fn penalty(&self) -> i64 {
        self.matrices.penalty()
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn demands(&self) -> Vec<i64> {
        self.visits().iter().map(|visit| visit.demand).collect()
    }

    pub fn service_times(&self) -> Vec<i64> {
        self.visits()
            .iter()
            .map(|visit| visit.service_minutes)
            .collect()
    }

    pub fn time_windows(&self) -> Vec<TimeWindow> {
        self.visits().iter().map(|visit| visit.window).collect()
    }

    /// Disjunction groups: one per store over its window variants, then one
    /// singleton per pickup.
    pub fn disjunction_groups(&self) -> Vec<Vec<usize>> {
        let mut groups = self.graph.client_groups();
        groups.extend(
            self.graph
                .indices_of(VisitKind::Pickup)
                .into_iter()
                .map(|index| vec![index]),
        );
        groups
    }
}
