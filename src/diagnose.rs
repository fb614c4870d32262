//! Why a visit was left out of the plan.
//!
//! Causes are checked from the most structural to the least, and the first
//! match wins, so a data problem is never reported as a search tradeoff.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::instance::RoutingInstance;
use crate::visits::DEPOT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscardReason {
    /// The visit's load exceeds the largest vehicle.
    CapacityExceeded,
    /// No compatible edge from the depot.
    IncompatibleEdge,
    /// Window is `00:00 - 00:00`.
    ClosedWindow,
    /// Driving from the depot alone overshoots the window end.
    UnreachableInTime,
    /// Nothing structural; skipping was cheaper than inserting.
    Unclassified,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DiscardReason::CapacityExceeded => "load exceeds every vehicle capacity",
            DiscardReason::IncompatibleEdge => "no compatible edge from the depot",
            DiscardReason::ClosedWindow => "time window is closed (00:00 - 00:00)",
            DiscardReason::UnreachableInTime => "travel from the depot ends after the window closes",
            DiscardReason::Unclassified => "skip penalty cheaper than insertion",
        };
        f.write_str(text)
    }
}

/// An inactive visit and its cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub visit: usize,
    pub location_id: String,
    pub reason: DiscardReason,
}

/// Classify one visit, regardless of whether it was served.
pub fn classify(instance: &RoutingInstance, visit: usize) -> DiscardReason {
    let node = instance.visit(visit);

    if node.load() > instance.fleet().max_capacity() {
        return DiscardReason::CapacityExceeded;
    }
    if instance.distance().value(DEPOT, visit) >= instance.penalty() {
        return DiscardReason::IncompatibleEdge;
    }
    if node.window.is_closed() {
        return DiscardReason::ClosedWindow;
    }
    if instance.time().value(DEPOT, visit) > node.window.end {
        return DiscardReason::UnreachableInTime;
    }
    DiscardReason::Unclassified
}

/// Diagnose every inactive non-depot visit.
///
/// `active` is indexed by visit; missing entries count as inactive.
pub fn diagnose(instance: &RoutingInstance, active: &[bool]) -> Vec<Diagnosis> {
    (0..instance.len())
        .filter(|&visit| visit != DEPOT && !active.get(visit).copied().unwrap_or(false))
        .map(|visit| {
            let reason = classify(instance, visit);
            let location_id = instance.visit(visit).location_id.clone();
            warn!(visit, location = %location_id, %reason, "visit not served");
            Diagnosis {
                visit,
                location_id,
                reason,
            }
        })
        .collect()
}
