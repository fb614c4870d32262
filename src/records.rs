//! Raw tabular records as supplied by the data warehouse.
//!
//! Records are plain data. Nothing here is validated beyond parsing; the
//! compilation stages decide what is malformed.

use serde::{Deserialize, Serialize};

/// Prefix shared by the depot and the pickup warehouses.
pub const WAREHOUSE_PREFIX: char = 'A';

/// Prefix of retail store locations.
pub const CLIENT_PREFIX: char = 'C';

/// Width of the numeric part of a client location code.
const CLIENT_CODE_WIDTH: usize = 5;

/// What a physical location is, derived from its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationKind {
    Depot,
    Warehouse,
    Client,
    Other,
}

/// Classify an identifier by the naming convention.
pub fn location_kind(id: &str, depot_id: &str) -> LocationKind {
    if id == depot_id {
        LocationKind::Depot
    } else if id.starts_with(WAREHOUSE_PREFIX) {
        LocationKind::Warehouse
    } else if id.starts_with(CLIENT_PREFIX) {
        LocationKind::Client
    } else {
        LocationKind::Other
    }
}

/// Normalize a raw client code into its location identifier.
///
/// Numeric codes are zero-padded and prefixed (`"123"` becomes `"C00123"`).
/// Codes that already carry the client prefix are returned trimmed.
pub fn client_location_id(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with(CLIENT_PREFIX) {
        return raw.to_string();
    }
    // Warehouse exports sometimes render integer codes as floats ("123.0").
    let digits = raw.split('.').next().unwrap_or(raw);
    match digits.parse::<u64>() {
        Ok(code) => format!("{}{:0width$}", CLIENT_PREFIX, code, width = CLIENT_CODE_WIDTH),
        Err(_) => format!("{}{}", CLIENT_PREFIX, digits),
    }
}

/// A depot, warehouse or store with coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalLocation {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl PhysicalLocation {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
        }
    }

    /// Coordinates as (lat, lng).
    pub fn coords(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Directed travel data between two physical locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub origin: String,
    pub destination: String,
    /// Distance in kilometers.
    pub distance_km: f64,
    /// Travel time in minutes.
    pub time_min: f64,
    pub compatible: bool,
}

impl EdgeRecord {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        distance_km: f64,
        time_min: f64,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            distance_km,
            time_min,
            compatible: true,
        }
    }

    pub fn incompatible(mut self) -> Self {
        self.compatible = false;
        self
    }
}

/// Parse the warehouse's `S`/`N` compatibility flag. Only `N` forbids an edge.
pub fn parse_compatibility(flag: &str) -> bool {
    !flag.trim().eq_ignore_ascii_case("n")
}

/// Load required by a client on a planning day, in MCE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    pub client_id: String,
    /// Planning day (unix timestamp, date only).
    pub day: i64,
    pub load: f64,
}

/// A raw time window for one client and sub-process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub client_id: String,
    pub process: String,
    /// Raw `HH:MM[:SS]` opening time.
    pub start: String,
    /// Raw `HH:MM[:SS]` closing time.
    pub end: String,
}

/// Average unloading time at a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTimeRecord {
    pub client_id: String,
    pub minutes: Option<f64>,
}

/// All raw tables for one planning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecords {
    pub locations: Vec<PhysicalLocation>,
    pub edges: Vec<EdgeRecord>,
    pub demands: Vec<DemandRecord>,
    pub windows: Vec<WindowRecord>,
    pub service_times: Vec<ServiceTimeRecord>,
}
