//! Seams to the collaborators around the instance compiler.
//!
//! The compiler owns none of these: records come from a warehouse, edges may
//! come from a routing service, and the route search runs in an external
//! engine. Implementations live with the host application (or, for edges,
//! in [`crate::osrm`] and [`crate::haversine`]).

use crate::assignment::Assignment;
use crate::error::Result;
use crate::model::SearchParameters;
use crate::records::{
    DemandRecord, EdgeRecord, PhysicalLocation, RawRecords, ServiceTimeRecord, WindowRecord,
};

/// Tabular source of the raw planning records.
pub trait RecordSource {
    fn locations(&self) -> Result<Vec<PhysicalLocation>>;

    fn edges(&self) -> Result<Vec<EdgeRecord>>;

    /// Demand rows, restricted to a planning day when one is given.
    fn demands(&self, day: Option<i64>) -> Result<Vec<DemandRecord>>;

    fn windows(&self) -> Result<Vec<WindowRecord>>;

    fn service_times(&self) -> Result<Vec<ServiceTimeRecord>>;
}

impl RecordSource for RawRecords {
    fn locations(&self) -> Result<Vec<PhysicalLocation>> {
        Ok(self.locations.clone())
    }

    fn edges(&self) -> Result<Vec<EdgeRecord>> {
        Ok(self.edges.clone())
    }

    fn demands(&self, day: Option<i64>) -> Result<Vec<DemandRecord>> {
        Ok(self
            .demands
            .iter()
            .filter(|record| day.is_none_or(|day| day == record.day))
            .cloned()
            .collect())
    }

    fn windows(&self) -> Result<Vec<WindowRecord>> {
        Ok(self.windows.clone())
    }

    fn service_times(&self) -> Result<Vec<ServiceTimeRecord>> {
        Ok(self.service_times.clone())
    }
}

/// Produces directed edge records for a set of physical locations.
///
/// Every ordered pair of distinct locations gets one record.
pub trait EdgeProvider {
    fn edges_for(&self, locations: &[PhysicalLocation]) -> Result<Vec<EdgeRecord>>;
}

/// Handle to a transit evaluator registered with an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitId(pub usize);

/// Handle to a cumulative dimension declared with an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionId(pub usize);

/// Integer transit between two nodes, materialized for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transit {
    /// Full `[from][to]` matrix.
    Arc(Vec<Vec<i64>>),
    /// Value charged when leaving a node.
    Origin(Vec<i64>),
    /// Value charged when arriving at a node.
    Destination(Vec<i64>),
}

impl Transit {
    pub fn evaluate(&self, from: usize, to: usize) -> i64 {
        match self {
            Transit::Arc(matrix) => matrix[from][to],
            Transit::Origin(values) => values[from],
            Transit::Destination(values) => values[to],
        }
    }
}

/// A cumulative quantity tracked along each vehicle's route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSpec {
    pub name: String,
    pub transit: TransitId,
    /// Largest allowed gap between consecutive cumulative values beyond transit.
    pub slack_max: i64,
    /// Upper bound of the cumulative value, per vehicle.
    pub capacities: Vec<i64>,
    pub fix_start_cumul_to_zero: bool,
}

/// The capability set the model assembler needs from a route-search engine.
///
/// Nodes are visit indices; every vehicle starts and ends at the depot node.
pub trait RoutingEngine {
    fn declare_graph(&mut self, nodes: usize, vehicles: usize, depot: usize) -> Result<()>;

    fn register_transit(&mut self, transit: Transit) -> Result<TransitId>;

    /// Use a registered transit as the arc cost of every vehicle.
    fn set_arc_cost(&mut self, transit: TransitId) -> Result<()>;

    fn add_dimension(&mut self, dimension: DimensionSpec) -> Result<DimensionId>;

    /// Pin a vehicle's cumulative value at its start node.
    fn set_start_cumul(&mut self, dimension: DimensionId, vehicle: usize, value: i64)
    -> Result<()>;

    fn set_cumul_range(&mut self, dimension: DimensionId, node: usize, min: i64, max: i64)
    -> Result<()>;

    fn set_span_upper_bound(&mut self, dimension: DimensionId, vehicle: usize, bound: i64)
    -> Result<()>;

    /// At most `max_active` of `nodes` are visited; skipping them costs `penalty`.
    fn add_disjunction(&mut self, nodes: &[usize], penalty: i64, max_active: usize) -> Result<()>;

    /// Run the search. `Ok(None)` means no solution was found in the budget.
    fn solve(&mut self, parameters: &SearchParameters) -> Result<Option<Assignment>>;
}
