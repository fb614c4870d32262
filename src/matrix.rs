//! Distance and time matrices over virtual visits.
//!
//! Arcs are [`ArcCost::Forbidden`] when the edge table has no compatible
//! record for the pair of physical locations. Forbidden arcs become a large
//! finite penalty only when a matrix is materialized for the solver.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::records::EdgeRecord;
use crate::visits::VisitGraph;

/// Lower bound of the forbidden-arc penalty.
pub const PENALTY_FLOOR: i64 = 5_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArcCost {
    Finite(i64),
    Forbidden,
}

impl ArcCost {
    pub fn finite(self) -> Option<i64> {
        match self {
            ArcCost::Finite(cost) => Some(cost),
            ArcCost::Forbidden => None,
        }
    }

    pub fn is_forbidden(self) -> bool {
        self == ArcCost::Forbidden
    }
}

/// Square matrix indexed by visit index.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    cells: Vec<Vec<ArcCost>>,
    penalty: i64,
}

impl CostMatrix {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cost(&self, from: usize, to: usize) -> ArcCost {
        self.cells[from][to]
    }

    /// Integral arc value as handed to the solver.
    pub fn value(&self, from: usize, to: usize) -> i64 {
        self.cost(from, to).finite().unwrap_or(self.penalty)
    }

    /// Value that stands in for a forbidden arc.
    pub fn penalty(&self) -> i64 {
        self.penalty
    }

    /// Materialize every row for a solver that needs plain integers.
    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cost| cost.finite().unwrap_or(self.penalty))
                    .collect()
            })
            .collect()
    }

    /// Largest finite arc value.
    pub fn max_finite(&self) -> i64 {
        self.cells
            .iter()
            .flatten()
            .filter_map(|cost| cost.finite())
            .max()
            .unwrap_or(0)
    }

    fn finite_sum(&self) -> i64 {
        self.cells
            .iter()
            .flatten()
            .filter_map(|cost| cost.finite())
            .fold(0i64, i64::saturating_add)
    }
}

/// The pair of matrices the model is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrices {
    pub distance: CostMatrix,
    pub time: CostMatrix,
}

impl Matrices {
    pub fn penalty(&self) -> i64 {
        self.distance.penalty
    }
}

#[derive(Debug, Clone, Copy)]
struct Arc {
    distance: i64,
    time: i64,
    compatible: bool,
}

/// Build both matrices from the visit graph and the raw edge table.
pub fn compile_matrices(graph: &VisitGraph, edges: &[EdgeRecord]) -> Result<Matrices> {
    if edges.is_empty() {
        return Err(Error::EmptyEdgeTable);
    }

    let arcs = index_edges(graph, edges)?;
    if arcs.is_empty() {
        return Err(Error::UnusableEdgeTable {
            records: edges.len(),
        });
    }
    let visits = graph.visits();

    let rows: Vec<(Vec<ArcCost>, Vec<ArcCost>)> = (0..visits.len())
        .into_par_iter()
        .map(|i| {
            let mut distance = Vec::with_capacity(visits.len());
            let mut time = Vec::with_capacity(visits.len());
            for j in 0..visits.len() {
                let (d, t) = if i == j || graph.same_location(i, j) {
                    (ArcCost::Finite(0), ArcCost::Finite(0))
                } else {
                    match arcs.get(&(visits[i].location, visits[j].location)) {
                        Some(arc) if arc.compatible => {
                            (ArcCost::Finite(arc.distance), ArcCost::Finite(arc.time))
                        }
                        _ => (ArcCost::Forbidden, ArcCost::Forbidden),
                    }
                };
                distance.push(d);
                time.push(t);
            }
            (distance, time)
        })
        .collect();

    let (distance, time): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    let mut distance = CostMatrix {
        cells: distance,
        penalty: 0,
    };
    let mut time = CostMatrix {
        cells: time,
        penalty: 0,
    };

    let penalty = distance
        .finite_sum()
        .max(time.finite_sum())
        .saturating_add(1)
        .max(PENALTY_FLOOR);
    distance.penalty = penalty;
    time.penalty = penalty;

    Ok(Matrices { distance, time })
}

/// Key the edge table by physical index, rounding once for both matrices.
fn index_edges(graph: &VisitGraph, edges: &[EdgeRecord]) -> Result<HashMap<(usize, usize), Arc>> {
    let mut arcs = HashMap::with_capacity(edges.len());

    for edge in edges {
        let invalid = |reason: &str| Error::InvalidEdge {
            origin: edge.origin.clone(),
            destination: edge.destination.clone(),
            reason: reason.to_string(),
        };
        if !edge.distance_km.is_finite() || edge.distance_km < 0.0 {
            return Err(invalid("distance must be a non-negative number"));
        }
        if !edge.time_min.is_finite() || edge.time_min < 0.0 {
            return Err(invalid("time must be a non-negative number"));
        }

        // Edges between locations outside the planning run are irrelevant.
        let (Some(origin), Some(destination)) = (
            graph.physical_index(&edge.origin),
            graph.physical_index(&edge.destination),
        ) else {
            continue;
        };

        let arc = Arc {
            distance: edge.distance_km.round() as i64,
            time: edge.time_min.round() as i64,
            compatible: edge.compatible,
        };
        if arcs.insert((origin, destination), arc).is_some() {
            return Err(Error::DuplicateEdge {
                origin: edge.origin.clone(),
                destination: edge.destination.clone(),
            });
        }
    }

    Ok(arcs)
}
