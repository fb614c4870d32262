//! Error types for instance compilation, model assembly and edge providers.

use thiserror::Error;

use crate::assignment::Violation;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("edge table is empty, cannot build the cost matrices")]
    EmptyEdgeTable,

    #[error("none of the {records} edge records joins two known locations")]
    UnusableEdgeTable { records: usize },

    #[error("depot location {id} is not in the location table")]
    MissingDepot { id: String },

    #[error("location {id} appears more than once in the location table")]
    DuplicateLocation { id: String },

    #[error("unknown physical location {id}")]
    UnknownLocation { id: String },

    #[error("invalid edge {origin} -> {destination}: {reason}")]
    InvalidEdge {
        origin: String,
        destination: String,
        reason: String,
    },

    #[error("duplicate edge {origin} -> {destination}")]
    DuplicateEdge { origin: String, destination: String },

    #[error("fleet has no vehicles")]
    EmptyFleet,

    #[error("pickup demand must not be negative, got {quantity}")]
    NegativePickupDemand { quantity: i64 },

    #[error("visit {visit} ({location}) opens at minute {start}, after the {horizon} minute horizon")]
    WindowPastHorizon {
        visit: usize,
        location: String,
        start: i64,
        horizon: i64,
    },

    #[error("routing engine: {0}")]
    Engine(String),

    #[error("OSRM request failed: {0}")]
    Osrm(#[from] reqwest::Error),

    #[error("OSRM response: {0}")]
    OsrmResponse(String),

    #[error(transparent)]
    Contract(#[from] Violation),
}
