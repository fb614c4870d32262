//! Haversine edge provider (fallback when no edge table or OSRM is available).
//!
//! Uses great-circle distance to estimate travel time.
//! Less accurate than road routing but always available.

use crate::error::Result;
use crate::records::{EdgeRecord, PhysicalLocation};
use crate::traits::EdgeProvider;

/// Average truck speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 60.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based edge provider.
///
/// Every estimated edge is marked compatible; compatibility rules only
/// exist in the warehouse's edge table.
#[derive(Debug, Clone)]
pub struct HaversineEdges {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineEdges {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineEdges {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Calculate haversine distance between two points in kilometers.
    fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
        let (lat1, lng1) = from;
        let (lat2, lng2) = to;

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lng = (lng2 - lng1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    /// Convert distance in km to travel time in minutes.
    fn km_to_minutes(&self, km: f64) -> f64 {
        km / self.speed_kmh * 60.0
    }
}

impl EdgeProvider for HaversineEdges {
    fn edges_for(&self, locations: &[PhysicalLocation]) -> Result<Vec<EdgeRecord>> {
        let mut edges = Vec::with_capacity(locations.len() * locations.len().saturating_sub(1));

        for from in locations {
            for to in locations {
                if from.id == to.id {
                    continue;
                }
                let km = Self::haversine_km(from.coords(), to.coords());
                edges.push(EdgeRecord::new(
                    from.id.clone(),
                    to.id.clone(),
                    km,
                    self.km_to_minutes(km),
                ));
            }
        }

        Ok(edges)
    }
}
