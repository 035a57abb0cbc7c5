// Pump service - Manual and automatic control of the irrigation relay
use crate::application::error::GatewayError;
use crate::application::telemetry_repository::{Channel, FeedRepository};
use crate::domain::pump::{PumpState, auto_pump_decision};
use crate::domain::telemetry::SensorReading;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpStatus {
    pub success: bool,
    pub state: PumpState,
    pub value: u8,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPumpReport {
    pub moisture: f64,
    pub previous_state: PumpState,
    /// State written this round, `None` when the pump was left alone.
    pub action: Option<PumpState>,
    /// ThingSpeak entry id of the write.
    pub result: Option<String>,
}

#[derive(Clone)]
pub struct PumpService {
    repository: Arc<dyn FeedRepository>,
    field: u8,
}

impl PumpService {
    pub fn new(repository: Arc<dyn FeedRepository>, field: u8) -> Self {
        Self { repository, field }
    }

    /// Writes the pump state and returns the ThingSpeak entry id.
    pub async fn set(&self, state: PumpState) -> Result<String, GatewayError> {
        let entry_id = self
            .repository
            .write_field(self.field, state.field_value())
            .await?;
        tracing::info!(state = state.as_str(), entry_id = %entry_id, "Pump state written");
        Ok(entry_id)
    }

    pub async fn status(&self) -> Result<PumpStatus, GatewayError> {
        let feeds = self.repository.feeds(Channel::Pump, 1).await?;
        let latest = feeds.last();
        let state = PumpState::from_field(latest.and_then(|feed| feed.field(self.field)));
        Ok(PumpStatus {
            success: true,
            state,
            value: state.field_value(),
            last_update: latest.and_then(|feed| feed.created_at),
        })
    }

    /// Applies the automatic irrigation rule to the latest soil moisture reading.
    pub async fn auto(&self) -> Result<AutoPumpReport, GatewayError> {
        let feeds = self.repository.feeds(Channel::Sensors, 1).await?;
        let moisture = feeds
            .last()
            .map(|feed| SensorReading::from_feed(feed).soil_moisture)
            .ok_or_else(|| GatewayError::NoData("No soil moisture reading available".to_string()))?;
        let previous_state = self.status().await?.state;

        let action = auto_pump_decision(moisture, previous_state);
        let result = match action {
            Some(state) => Some(self.set(state).await?),
            None => None,
        };
        tracing::debug!(moisture, ?action, "Automatic pump check");

        Ok(AutoPumpReport {
            moisture,
            previous_state,
            action,
            result,
        })
    }
}
