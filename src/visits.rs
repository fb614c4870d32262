//! Virtual visit graph.
//!
//! A physical store becomes one visit per consolidated window, the depot and
//! each pickup warehouse become exactly one. The index a visit receives here
//! is its identity for every later stage: matrix row/column, solver node and
//! diagnosis subject.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::records::{location_kind, LocationKind, PhysicalLocation};
use crate::windows::{ClientWindow, TimeWindow};

/// Index of the depot visit.
pub const DEPOT: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitKind {
    Depot,
    Client,
    Pickup,
}

/// Load carried onto the vehicle at a pickup warehouse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupDemand {
    /// Pickups do not touch the capacity dimension.
    #[default]
    Zero,
    /// Every pickup adds this many units.
    Fixed(i64),
}

impl PickupDemand {
    fn demand(self) -> i64 {
        match self {
            PickupDemand::Zero => 0,
            PickupDemand::Fixed(quantity) => quantity,
        }
    }
}

/// A schedulable node of the routing graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub location_id: String,
    /// Index of the physical location in [`VisitGraph::locations`].
    pub location: usize,
    pub kind: VisitKind,
    pub window: TimeWindow,
    /// Signed load change: negative for deliveries.
    pub demand: i64,
    pub service_minutes: i64,
    pub process: String,
}

impl Visit {
    /// Quantity handled at this visit, regardless of direction.
    pub fn load(&self) -> i64 {
        self.demand.abs()
    }

    pub fn is_depot(&self) -> bool {
        self.kind == VisitKind::Depot
    }
}

/// Inputs of [`build_visit_graph`], already aggregated per client.
#[derive(Debug, Clone)]
pub struct GraphInputs<'a> {
    pub locations: &'a [PhysicalLocation],
    /// Client location id -> total load for the day.
    pub demands: &'a BTreeMap<String, f64>,
    /// Client location id -> consolidated windows.
    pub windows: &'a BTreeMap<String, Vec<ClientWindow>>,
    /// Client location id -> unloading minutes.
    pub service_times: &'a HashMap<String, i64>,
    pub depot_id: &'a str,
    pub fallback_process: &'a str,
    pub pickup_demand: PickupDemand,
}

/// Visits plus the bidirectional index between visits and physical locations.
#[derive(Debug, Clone)]
pub struct VisitGraph {
    locations: Vec<PhysicalLocation>,
    location_index: HashMap<String, usize>,
    visits: Vec<Visit>,
    by_location: Vec<Vec<usize>>,
}

impl VisitGraph {
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn visit(&self, index: usize) -> &Visit {
        &self.visits[index]
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    pub fn locations(&self) -> &[PhysicalLocation] {
        &self.locations
    }

    /// Physical location a visit belongs to.
    pub fn location_of(&self, visit: usize) -> &PhysicalLocation {
        &self.locations[self.visits[visit].location]
    }

    /// Physical index for an identifier.
    pub fn physical_index(&self, id: &str) -> Option<usize> {
        self.location_index.get(id).copied()
    }

    /// Visit indices built for a physical location, in build order.
    pub fn visits_at(&self, id: &str) -> &[usize] {
        self.physical_index(id)
            .map(|index| self.by_location[index].as_slice())
            .unwrap_or(&[])
    }

    pub fn same_location(&self, a: usize, b: usize) -> bool {
        self.visits[a].location == self.visits[b].location
    }

    /// Client visits grouped by store, in order of first visit index.
    pub fn client_groups(&self) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = self
            .by_location
            .iter()
            .filter(|group| {
                group
                    .first()
                    .is_some_and(|&first| self.visits[first].kind == VisitKind::Client)
            })
            .cloned()
            .collect();
        groups.sort_by_key(|group| group[0]);
        groups
    }

    pub fn indices_of(&self, kind: VisitKind) -> Vec<usize> {
        self.visits
            .iter()
            .enumerate()
            .filter(|(_, visit)| visit.kind == kind)
            .map(|(index, _)| index)
            .collect()
    }

    fn push(&mut self, visit: Visit) {
        self.by_location[visit.location].push(self.visits.len());
        self.visits.push(visit);
    }
}

/// Expand physical locations into the ordered visit list.
///
/// Order: depot, then clients with positive load (one visit per window, or a
/// single full-day fallback), then every non-depot warehouse as a pickup.
pub fn build_visit_graph(inputs: &GraphInputs<'_>) -> Result<VisitGraph> {
    let mut location_index = HashMap::with_capacity(inputs.locations.len());
    for (index, location) in inputs.locations.iter().enumerate() {
        if location_index.insert(location.id.clone(), index).is_some() {
            return Err(Error::DuplicateLocation {
                id: location.id.clone(),
            });
        }
    }

    let mut graph = VisitGraph {
        locations: inputs.locations.to_vec(),
        location_index,
        visits: Vec::new(),
        by_location: vec![Vec::new(); inputs.locations.len()],
    };

    let depot = graph
        .physical_index(inputs.depot_id)
        .ok_or_else(|| Error::MissingDepot {
            id: inputs.depot_id.to_string(),
        })?;
    graph.push(Visit {
        location_id: inputs.depot_id.to_string(),
        location: depot,
        kind: VisitKind::Depot,
        window: TimeWindow::FULL_DAY,
        demand: 0,
        service_minutes: 0,
        process: "DEPOT".to_string(),
    });

    for (client_id, &load) in inputs.demands {
        if load <= 0.0 {
            continue;
        }

        let location = graph
            .physical_index(client_id)
            .ok_or_else(|| Error::UnknownLocation {
                id: client_id.clone(),
            })?;
        let demand = -(load.trunc() as i64);
        if demand == 0 {
            debug!(client = %client_id, load, "load below one MCE, visit carries no demand");
        }
        let service_minutes = inputs.service_times.get(client_id).copied().unwrap_or(0);

        let windows = inputs
            .windows
            .get(client_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        if windows.is_empty() {
            debug!(client = %client_id, "no time window, using full-day fallback");
            graph.push(Visit {
                location_id: client_id.clone(),
                location,
                kind: VisitKind::Client,
                window: TimeWindow::FULL_DAY,
                demand,
                service_minutes,
                process: inputs.fallback_process.to_string(),
            });
            continue;
        }

        for window in windows {
            graph.push(Visit {
                location_id: client_id.clone(),
                location,
                kind: VisitKind::Client,
                window: window.window,
                demand,
                service_minutes,
                process: window.process.clone(),
            });
        }
    }

    let mut warehouses: Vec<(usize, &PhysicalLocation)> = inputs
        .locations
        .iter()
        .enumerate()
        .filter(|(_, location)| {
            location_kind(&location.id, inputs.depot_id) == LocationKind::Warehouse
        })
        .collect();
    warehouses.sort_by(|a, b| a.1.id.cmp(&b.1.id));

    for (location, warehouse) in warehouses {
        graph.push(Visit {
            location_id: warehouse.id.clone(),
            location,
            kind: VisitKind::Pickup,
            window: TimeWindow::FULL_DAY,
            demand: inputs.pickup_demand.demand(),
            service_minutes: 0,
            process: "PICKUP".to_string(),
        });
    }

    Ok(graph)
}
