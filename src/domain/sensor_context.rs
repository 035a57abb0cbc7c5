// Request-scoped sensor context handed to AI prompts
use serde::Serialize;

use super::location::Coordinates;
use super::telemetry::NpkReading;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorContext {
    pub location: Coordinates,
    pub location_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub npk: NpkReading,
}

impl SensorContext {
    /// Context with no readings yet, as used before the first refresh.
    pub fn empty(location: Coordinates, location_name: impl Into<String>) -> Self {
        Self {
            location,
            location_name: location_name.into(),
            temperature: 0.0,
            humidity: 0.0,
            soil_moisture: 0.0,
            npk: NpkReading::default(),
        }
    }

    pub fn variables(&self) -> GeminiVariables {
        GeminiVariables {
            location_name: self.location_name.clone(),
            temperature: self.temperature,
            humidity: self.humidity,
            soil_moisture: self.soil_moisture,
            npk_nitrogen: self.npk.nitrogen,
            npk_phosphorus: self.npk.phosphorus,
            npk_potassium: self.npk.potassium,
            npk_average: self.npk.average(),
        }
    }

    /// One-line summary for prompts that do not take the JSON block.
    pub fn summary(&self) -> String {
        format!(
            "Location: {}, Humidity: {}%, Soil Moisture: {}%, NPK: N={}ppm, P={}ppm, K={}ppm",
            self.location_name,
            self.humidity,
            self.soil_moisture,
            self.npk.nitrogen,
            self.npk.phosphorus,
            self.npk.potassium
        )
    }
}

/// The flat variable set embedded in prompts as `SENSOR_CONTEXT_JSON`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiVariables {
    pub location_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub npk_nitrogen: f64,
    pub npk_phosphorus: f64,
    pub npk_potassium: f64,
    pub npk_average: f64,
}

impl GeminiVariables {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
