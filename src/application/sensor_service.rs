// Sensor service - Channel readings, trends and the per-request sensor context
use crate::application::error::GatewayError;
use crate::application::location_service::LocationService;
use crate::application::telemetry_repository::{Channel, FeedRepository};
use crate::application::weather_service::WeatherService;
use crate::domain::location::Coordinates;
use crate::domain::sensor_context::SensorContext;
use crate::domain::telemetry::{
    NpkReading, SensorReading, SoilMoisture, TimeRange, Trend, VitalStats, calculate_trend,
    latest_pair,
};
use serde::Serialize;
use std::sync::Arc;

const NO_FEEDS: &str =
    "No data available from ThingSpeak. The channel might be empty or the API key might be invalid.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilMoistureReport {
    pub current_data: SoilMoisture,
    pub history_data: Vec<SensorReading>,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NpkCurrent {
    pub current: NpkReading,
    pub average: f64,
    pub trend: Trend,
}

#[derive(Clone)]
pub struct SensorService {
    repository: Arc<dyn FeedRepository>,
    weather: WeatherService,
    location: LocationService,
}

impl SensorService {
    pub fn new(
        repository: Arc<dyn FeedRepository>,
        weather: WeatherService,
        location: LocationService,
    ) -> Self {
        Self {
            repository,
            weather,
            location,
        }
    }

    pub async fn history(&self, range: TimeRange) -> Result<Vec<SensorReading>, GatewayError> {
        let feeds = self
            .repository
            .feeds(Channel::Sensors, range.result_count())
            .await?;
        Ok(feeds.iter().map(SensorReading::from_feed).collect())
    }

    pub async fn soil_moisture(&self, range: TimeRange) -> Result<SoilMoistureReport, GatewayError> {
        let history = self.history(range).await?;
        let (latest, previous) =
            latest_pair(&history).ok_or_else(|| GatewayError::NoData(NO_FEEDS.to_string()))?;

        Ok(SoilMoistureReport {
            current_data: SoilMoisture {
                time: latest.time,
                soil_moisture: latest.soil_moisture,
            },
            trend: calculate_trend(latest.soil_moisture, previous.soil_moisture),
            history_data: history,
        })
    }

    pub async fn npk(&self, range: TimeRange) -> Result<Vec<NpkReading>, GatewayError> {
        let history = self.history(range).await?;
        Ok(history.iter().map(SensorReading::npk).collect())
    }

    /// Latest NPK reading and the trend of its average against the entry before.
    pub async fn npk_current(&self) -> Result<NpkCurrent, GatewayError> {
        let feeds = self.repository.feeds(Channel::Sensors, 2).await?;
        let readings: Vec<NpkReading> = feeds
            .iter()
            .map(|feed| SensorReading::from_feed(feed).npk())
            .collect();
        let (latest, previous) =
            latest_pair(&readings).ok_or_else(|| GatewayError::NoData(NO_FEEDS.to_string()))?;

        Ok(NpkCurrent {
            current: *latest,
            average: latest.average(),
            trend: calculate_trend(latest.average(), previous.average()),
        })
    }

    pub async fn vital_stats(&self, range: TimeRange) -> Result<Vec<VitalStats>, GatewayError> {
        let feeds = self
            .repository
            .feeds(Channel::VitalStats, range.result_count())
            .await?;
        Ok(feeds.iter().map(VitalStats::from_feed).collect())
    }

    pub async fn latest(&self) -> Result<SensorReading, GatewayError> {
        let feeds = self.repository.feeds(Channel::Sensors, 1).await?;
        feeds
            .last()
            .map(SensorReading::from_feed)
            .ok_or_else(|| GatewayError::NoData(NO_FEEDS.to_string()))
    }

    /// Builds the context handed to AI prompts. Location, weather and the
    /// latest probe reading are fetched concurrently; a failed fetch leaves its
    /// values at zero.
    pub async fn context(&self, at: Coordinates) -> SensorContext {
        let (name, weather, reading) = tokio::join!(
            self.location.name(at),
            self.weather.current(at),
            self.latest()
        );

        let mut context = SensorContext::empty(at, name);
        match weather {
            Ok(weather) => {
                context.temperature = weather.temperature;
                context.humidity = weather.humidity;
            }
            Err(e) => tracing::warn!("Weather unavailable for sensor context: {}", e),
        }
        match reading {
            Ok(reading) => {
                context.soil_moisture = reading.soil_moisture;
                context.npk = reading.npk();
            }
            Err(e) => tracing::warn!("Sensor feed unavailable for sensor context: {}", e),
        }
        context
    }
}
