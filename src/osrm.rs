//! OSRM HTTP adapter producing edge records from the table service.

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::records::{EdgeRecord, PhysicalLocation};
use crate::traits::EdgeProvider;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn table_url(&self, locations: &[PhysicalLocation]) -> String {
        let coords = locations
            .iter()
            .map(|location| format!("{:.6},{:.6}", location.longitude, location.latitude))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/table/v1/{}/{}?annotations=duration,distance",
            self.config.base_url, self.config.profile, coords
        )
    }
}

impl EdgeProvider for OsrmClient {
    fn edges_for(&self, locations: &[PhysicalLocation]) -> Result<Vec<EdgeRecord>> {
        if locations.len() < 2 {
            return Ok(Vec::new());
        }

        let body = self
            .client
            .get(self.table_url(locations))
            .send()?
            .error_for_status()?
            .json::<OsrmTableResponse>()?;

        if body.code != "Ok" {
            return Err(Error::OsrmResponse(format!("table service answered {}", body.code)));
        }
        let durations = body
            .durations
            .ok_or_else(|| Error::OsrmResponse("missing durations".to_string()))?;
        let distances = body
            .distances
            .ok_or_else(|| Error::OsrmResponse("missing distances".to_string()))?;
        if durations.len() != locations.len() || distances.len() != locations.len() {
            return Err(Error::OsrmResponse("table size does not match request".to_string()));
        }

        Ok(table_edges(locations, &durations, &distances))
    }
}

/// Turn OSRM seconds/meters tables into edge records. Unroutable pairs
/// (null entries) produce no record, which the matrix treats as forbidden.
fn table_edges(
    locations: &[PhysicalLocation],
    durations: &[Vec<Option<f64>>],
    distances: &[Vec<Option<f64>>],
) -> Vec<EdgeRecord> {
    let mut edges = Vec::new();
    for (i, from) in locations.iter().enumerate() {
        for (j, to) in locations.iter().enumerate() {
            if i == j {
                continue;
            }
            let duration = durations[i].get(j).copied().flatten();
            let distance = distances[i].get(j).copied().flatten();
            match (duration, distance) {
                (Some(seconds), Some(meters)) => edges.push(EdgeRecord::new(
                    from.id.clone(),
                    to.id.clone(),
                    meters / 1000.0,
                    seconds / 60.0,
                )),
                _ => debug!(from = %from.id, to = %to.id, "no route between locations"),
            }
        }
    }
    edges
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    durations: Option<Vec<Vec<Option<f64>>>>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_uses_lng_lat() {
        let client = OsrmClient::new(OsrmConfig::default()).unwrap();
        let url = client.table_url(&[
            PhysicalLocation::new("A00010", 42.88, -8.54),
            PhysicalLocation::new("C00001", 43.36, -8.41),
        ]);
        assert_eq!(
            url,
            "http://localhost:5000/table/v1/car/-8.540000,42.880000;-8.410000,43.360000?annotations=duration,distance"
        );
    }

    #[test]
    fn test_table_edges_converts_units() {
        let locations = vec![
            PhysicalLocation::new("A00010", 42.88, -8.54),
            PhysicalLocation::new("C00001", 43.36, -8.41),
        ];
        let durations = vec![vec![Some(0.0), Some(3600.0)], vec![Some(3540.0), Some(0.0)]];
        let distances = vec![vec![Some(0.0), Some(65_000.0)], vec![None, Some(0.0)]];

        let edges = table_edges(&locations, &durations, &distances);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].origin, "A00010");
        assert_eq!(edges[0].distance_km, 65.0);
        assert_eq!(edges[0].time_min, 60.0);
    }
}
