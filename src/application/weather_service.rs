// Weather service - Current conditions, forecast and evapotranspiration
use crate::application::error::GatewayError;
use crate::application::gateways::WeatherSource;
use crate::domain::location::Coordinates;
use crate::domain::weather::{DetailedWeather, WeatherSnapshot};
use std::sync::Arc;

#[derive(Clone)]
pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
}

impl WeatherService {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    pub async fn current(&self, at: Coordinates) -> Result<WeatherSnapshot, GatewayError> {
        Ok(self.source.forecast(at).await?.snapshot())
    }

    pub async fn detailed(&self, at: Coordinates) -> Result<DetailedWeather, GatewayError> {
        let forecast = self.source.forecast(at).await?;
        let evapotranspiration = forecast.evapotranspiration();
        if evapotranspiration.is_none() {
            tracing::warn!("No daily weather data, omitting evapotranspiration");
        }
        Ok(DetailedWeather {
            current: forecast.current_conditions(),
            forecast: forecast.daily_forecasts(),
            evapotranspiration,
        })
    }
}
