// Repository trait for ThingSpeak channel data
use crate::application::error::GatewayError;
use crate::domain::telemetry::Feed;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Soil moisture, weather and NPK probes
    Sensors,
    /// Spectral readings from the drone/leaf sensor
    VitalStats,
    Pump,
}

#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Most recent `results` feeds of a channel, oldest first
    async fn feeds(&self, channel: Channel, results: u32) -> Result<Vec<Feed>, GatewayError>;

    /// Writes `value` to `fieldN` of the pump channel and returns the new entry id.
    /// A refused write comes back as `GatewayError::RateLimited`.
    async fn write_field(&self, field: u8, value: u8) -> Result<String, GatewayError>;
}
