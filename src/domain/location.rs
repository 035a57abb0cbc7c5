// Location domain model
use serde::{Deserialize, Serialize};

/// Maximum euclidean distance, in degrees, between the queried point and a
/// geocoder result before the result's name is trusted (roughly 1 km).
pub const MAX_GEOCODE_DISTANCE_DEG: f64 = 0.01;

pub const DEFAULT_LATITUDE: f64 = 22.5626;
pub const DEFAULT_LONGITUDE: f64 = 88.363;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn degree_distance(&self, other: &Coordinates) -> f64 {
        ((self.latitude - other.latitude).powi(2) + (self.longitude - other.longitude).powi(2))
            .sqrt()
    }

    /// Raw coordinate label used whenever no trustworthy place name exists.
    pub fn label(&self) -> String {
        format!(
            "Coordinates: {:.6}°, {:.6}°",
            self.latitude, self.longitude
        )
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }
}

/// First result returned by the reverse geocoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeCandidate {
    pub point: Coordinates,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Chooses the display name for `query` given the geocoder's best candidate.
pub fn resolve_location_name(query: &Coordinates, candidate: Option<&GeocodeCandidate>) -> String {
    let Some(candidate) = candidate else {
        return "Location Name Unavailable".to_string();
    };

    if query.degree_distance(&candidate.point) > MAX_GEOCODE_DISTANCE_DEG {
        return query.label();
    }

    let parts: Vec<&str> = [&candidate.city, &candidate.state, &candidate.country]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        "Unknown Location".to_string()
    } else {
        parts.join(", ")
    }
}
