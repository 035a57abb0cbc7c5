// Location service - Reverse geocoding with a proximity check
use crate::application::gateways::Geocoder;
use crate::domain::location::{Coordinates, resolve_location_name};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationReport {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

#[derive(Clone)]
pub struct LocationService {
    geocoder: Arc<dyn Geocoder>,
}

impl LocationService {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Display name for `at`. Never fails: geocoder errors, including a missing
    /// key, fall back to the coordinate label.
    pub async fn name(&self, at: Coordinates) -> String {
        match self.geocoder.reverse(at).await {
            Ok(candidate) => resolve_location_name(&at, candidate.as_ref()),
            Err(e) => {
                tracing::warn!("Reverse geocoding failed, using coordinates: {}", e);
                at.label()
            }
        }
    }

    pub async fn resolve(&self, at: Coordinates) -> LocationReport {
        LocationReport {
            latitude: at.latitude,
            longitude: at.longitude,
            name: self.name(at).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::FakeGeocoder;
    use crate::domain::location::GeocodeCandidate;

    fn candidate(lat: f64, lon: f64) -> GeocodeCandidate {
        GeocodeCandidate {
            point: Coordinates::new(lat, lon),
            city: Some("Kolkata".into()),
            state: Some("West Bengal".into()),
            country: Some("India".into()),
        }
    }

    #[tokio::test]
    async fn test_nearby_result_is_named() {
        let service = LocationService::new(Arc::new(FakeGeocoder::found(candidate(22.5630, 88.3632))));
        let name = service.name(Coordinates::new(22.5626, 88.363)).await;
        assert_eq!(name, "Kolkata, West Bengal, India");
    }

    #[tokio::test]
    async fn test_far_result_uses_coordinates() {
        let service = LocationService::new(Arc::new(FakeGeocoder::found(candidate(22.7, 88.5))));
        let name = service.name(Coordinates::new(22.5626, 88.363)).await;
        assert_eq!(name, "Coordinates: 22.562600°, 88.363000°");
    }

    #[tokio::test]
    async fn test_geocoder_failure_uses_coordinates() {
        let service = LocationService::new(Arc::new(FakeGeocoder::failing()));
        let report = service.resolve(Coordinates::new(1.5, 2.25)).await;
        assert_eq!(report.name, "Coordinates: 1.500000°, 2.250000°");
    }

    #[tokio::test]
    async fn test_no_results() {
        let service = LocationService::new(Arc::new(FakeGeocoder::empty()));
        let name = service.name(Coordinates::default()).await;
        assert_eq!(name, "Location Name Unavailable");
    }
}
