// ML service - Crop recommendations and hyperspectral maps
use crate::application::error::GatewayError;
use crate::application::gateways::{HsiUpload, MlGateway};
use crate::application::sensor_service::SensorService;
use crate::domain::recommendation::{AgricultureDataset, RecommendationRequest, Urgency};
use crate::domain::telemetry::SensorReading;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

const INVALID_SENSOR_DATA: &str =
    "Missing or invalid sensor data. Required: n, p, k, temperature, humidity";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestRecommendation {
    pub reading: SensorReading,
    pub recommendation: Value,
    pub urgency: Urgency,
}

#[derive(Clone)]
pub struct MlService {
    gateway: Arc<dyn MlGateway>,
    sensors: SensorService,
}

impl MlService {
    pub fn new(gateway: Arc<dyn MlGateway>, sensors: SensorService) -> Self {
        Self { gateway, sensors }
    }

    pub async fn recommend(&self, body: &Value) -> Result<Value, GatewayError> {
        let request = RecommendationRequest::from_body(body)
            .ok_or_else(|| GatewayError::BadRequest(INVALID_SENSOR_DATA.to_string()))?;
        self.gateway.recommend(&request).await
    }

    pub async fn dataset(&self, dataset: AgricultureDataset) -> Result<Value, GatewayError> {
        self.gateway.dataset(dataset).await
    }

    /// Recommendation for the newest probe reading.
    pub async fn latest(&self) -> Result<LatestRecommendation, GatewayError> {
        let reading = self.sensors.latest().await?;
        let recommendation = self
            .gateway
            .recommend(&RecommendationRequest::from_reading(&reading))
            .await?;
        let urgency = Urgency::for_action(
            recommendation
                .get("action")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        );
        Ok(LatestRecommendation {
            reading,
            recommendation,
            urgency,
        })
    }

    pub async fn lstm_map(&self, body: Value) -> Result<Value, GatewayError> {
        self.gateway.lstm_map(body).await
    }

    pub async fn upload_map(&self, upload: HsiUpload) -> Result<Value, GatewayError> {
        self.gateway.upload_map(upload).await
    }
}
