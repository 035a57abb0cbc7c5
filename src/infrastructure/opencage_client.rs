// OpenCage reverse geocoding client
use crate::application::error::GatewayError;
use crate::application::gateways::Geocoder;
use crate::domain::location::{Coordinates, GeocodeCandidate};
use async_trait::async_trait;
use serde::Deserialize;

const SERVICE: &str = "OpenCage";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
    #[serde(default)]
    components: Components,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Default, Deserialize)]
struct Components {
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl From<GeocodeResult> for GeocodeCandidate {
    fn from(result: GeocodeResult) -> Self {
        GeocodeCandidate {
            point: Coordinates::new(result.geometry.lat, result.geometry.lng),
            city: result.components.city,
            state: result.components.state,
            country: result.components.country,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenCageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenCageClient {
    pub fn new(client: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl Geocoder for OpenCageClient {
    async fn reverse(&self, at: Coordinates) -> Result<Option<GeocodeCandidate>, GatewayError> {
        let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Err(GatewayError::Config("OpenCage API key is not configured".to_string()));
        };
        let url = format!(
            "{}?q={}+{}&key={}&language=en",
            self.base_url,
            at.latitude,
            at.longitude,
            urlencoding::encode(key)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::upstream(SERVICE, status.as_u16(), &body));
        }

        let data = response
            .json::<GeocodeResponse>()
            .await
            .map_err(|e| GatewayError::Decode(format!("Failed to parse OpenCage response: {}", e)))?;
        Ok(data.results.into_iter().next().map(GeocodeCandidate::from))
    }
}
