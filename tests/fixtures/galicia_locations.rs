//! Warehouse and store locations in Galicia for realistic test fixtures.
//!
//! Coordinates are town centres; they are only used for straight-line
//! estimates, never for road routing.

/// A coded location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(id: &'static str, name: &'static str, lat: f64, lng: f64) -> Self {
        Self { id, name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

// ============================================================================
// Depot and pickup warehouses
// ============================================================================

pub const DEPOT: Location = Location::new("A00010", "Santiago platform", 42.8782, -8.5448);

pub const WAREHOUSES: &[Location] = &[
    Location::new("A00031", "A Coruna returns", 43.3623, -8.4115),
    Location::new("A00047", "Lugo returns", 43.0097, -7.5568),
];

// ============================================================================
// Stores
// ============================================================================

pub const STORES: &[Location] = &[
    Location::new("C00101", "Pontevedra", 42.4310, -8.6444),
    Location::new("C00102", "Vigo Centro", 42.2406, -8.7207),
    Location::new("C00103", "Ourense", 42.3358, -7.8639),
    Location::new("C00104", "Ferrol", 43.4832, -8.2369),
    Location::new("C00105", "Lalin", 42.6617, -8.1121),
    Location::new("C00106", "Ribeira", 42.5546, -8.9914),
    Location::new("C00107", "Betanzos", 43.2804, -8.2130),
    Location::new("C00108", "Vilagarcia", 42.5960, -8.7645),
];
