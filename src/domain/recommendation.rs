// Agriculture recommendation models exchanged with the ML service
use serde::Serialize;
use serde_json::Value;

use super::telemetry::SensorReading;

/// Body forwarded to `/agriculture/recommendation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub n: f64,
    pub p: f64,
    pub k: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: Option<f64>,
}

impl RecommendationRequest {
    /// Validates an inbound body: `n`, `p`, `k`, `temperature` and `humidity`
    /// must be JSON numbers. A zero or missing `soil_moisture` is sent as null.
    pub fn from_body(body: &Value) -> Option<Self> {
        let number = |key: &str| body.get(key).and_then(Value::as_f64);
        Some(Self {
            n: number("n")?,
            p: number("p")?,
            k: number("k")?,
            temperature: number("temperature")?,
            humidity: number("humidity")?,
            soil_moisture: number("soil_moisture").filter(|m| *m != 0.0),
        })
    }

    pub fn from_reading(reading: &SensorReading) -> Self {
        Self {
            n: reading.nitrogen,
            p: reading.phosphorus,
            k: reading.potassium,
            temperature: reading.temperature,
            humidity: reading.humidity,
            soil_moisture: Some(reading.soil_moisture).filter(|m| *m != 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Urgent,
    Moderate,
    Good,
}

impl Urgency {
    pub fn for_action(action: &str) -> Self {
        match action {
            "Apply Pesticide" | "Irrigate" => Self::Urgent,
            "Apply Fertilizer" => Self::Moderate,
            _ => Self::Good,
        }
    }
}

/// Which reference dataset to read from the ML service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgricultureDataset {
    Statistics,
    NpkRanges,
}

impl AgricultureDataset {
    pub fn from_query(kind: Option<&str>) -> Self {
        match kind {
            Some("npk-ranges") => Self::NpkRanges,
            _ => Self::Statistics,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Statistics => "/agriculture/statistics",
            Self::NpkRanges => "/agriculture/npk-ranges",
        }
    }
}
