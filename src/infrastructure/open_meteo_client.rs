// Open-Meteo forecast client
use crate::application::error::GatewayError;
use crate::application::gateways::WeatherSource;
use crate::domain::location::Coordinates;
use crate::domain::weather::{CurrentWeather, DailyWeather, Forecast};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

const SERVICE: &str = "Open-Meteo";
const HOURLY: &str =
    "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation,surface_pressure,visibility";
const DAILY: &str = "temperature_2m_max,temperature_2m_min,temperature_2m_mean,relative_humidity_2m_mean,wind_speed_10m_max,precipitation_sum,precipitation_probability_max,uv_index_max,weather_code";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeatherPayload,
    #[serde(default)]
    hourly: HourlyPayload,
    #[serde(default)]
    daily: DailyPayload,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherPayload {
    time: String,
    temperature: f64,
    #[serde(default)]
    windspeed: f64,
    #[serde(default)]
    weathercode: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HourlyPayload {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
    precipitation: Vec<Option<f64>>,
    surface_pressure: Vec<Option<f64>>,
    visibility: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DailyPayload {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    temperature_2m_mean: Vec<Option<f64>>,
    relative_humidity_2m_mean: Vec<Option<f64>>,
    wind_speed_10m_max: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    uv_index_max: Vec<Option<f64>>,
    weather_code: Vec<Option<i64>>,
}

fn series(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(Option::unwrap_or_default).collect()
}

fn at<T: Copy>(values: &[Option<T>], index: usize) -> Option<T> {
    values.get(index).copied().flatten()
}

impl DailyPayload {
    fn into_days(self) -> Vec<DailyWeather> {
        self.time
            .iter()
            .enumerate()
            .filter_map(|(i, date)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                Some(DailyWeather {
                    date,
                    temperature_max: at(&self.temperature_2m_max, i).unwrap_or_default(),
                    temperature_min: at(&self.temperature_2m_min, i).unwrap_or_default(),
                    temperature_mean: at(&self.temperature_2m_mean, i),
                    humidity_mean: at(&self.relative_humidity_2m_mean, i),
                    wind_speed_max: at(&self.wind_speed_10m_max, i).unwrap_or_default(),
                    precipitation_sum: at(&self.precipitation_sum, i).unwrap_or_default(),
                    precipitation_probability_max: at(&self.precipitation_probability_max, i)
                        .unwrap_or_default(),
                    uv_index_max: at(&self.uv_index_max, i).unwrap_or_default(),
                    weather_code: at(&self.weather_code, i).unwrap_or_default(),
                })
            })
            .collect()
    }
}

impl From<ForecastResponse> for Forecast {
    fn from(response: ForecastResponse) -> Self {
        let hourly = response.hourly;
        Forecast {
            current: CurrentWeather {
                time: response.current_weather.time,
                temperature: response.current_weather.temperature,
                wind_speed: response.current_weather.windspeed,
                weather_code: response.current_weather.weathercode,
            },
            hourly_time: hourly.time,
            hourly_temperature: series(hourly.temperature_2m),
            hourly_humidity: series(hourly.relative_humidity_2m),
            hourly_wind_speed: series(hourly.wind_speed_10m),
            hourly_precipitation: series(hourly.precipitation),
            hourly_pressure: series(hourly.surface_pressure),
            hourly_visibility: series(hourly.visibility),
            daily: response.daily.into_days(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    fn forecast_url(&self, at: Coordinates) -> String {
        format!(
            "{}?latitude={}&longitude={}&current_weather=true&hourly={}&daily={}&past_days=7&forecast_days=7&timezone=auto",
            self.base_url, at.latitude, at.longitude, HOURLY, DAILY
        )
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn forecast(&self, at: Coordinates) -> Result<Forecast, GatewayError> {
        let response = self.client.get(self.forecast_url(at)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(service = SERVICE, status = status.as_u16(), "Forecast request failed");
            return Err(GatewayError::upstream(SERVICE, status.as_u16(), &body));
        }

        let payload = response
            .json::<ForecastResponse>()
            .await
            .map_err(|e| GatewayError::Decode(format!("Failed to parse Open-Meteo forecast: {}", e)))?;
        Ok(payload.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_requests_history_and_local_time() {
        let client = OpenMeteoClient::new(reqwest::Client::new(), "http://meteo/v1/forecast".into());
        let url = client.forecast_url(Coordinates::new(22.5, 88.3));
        assert!(url.starts_with("http://meteo/v1/forecast?latitude=22.5&longitude=88.3"));
        assert!(url.contains("past_days=7"));
        assert!(url.contains("timezone=auto"));
        assert!(url.contains("uv_index_max"));
    }

    #[test]
    fn test_payload_maps_to_forecast() {
        let raw = r#"{
            "current_weather": {"time": "2025-03-10T14:15", "temperature": 31.2, "windspeed": 9.0, "weathercode": 2},
            "hourly": {
                "time": ["2025-03-10T13:00", "2025-03-10T14:00"],
                "temperature_2m": [30.0, 31.0],
                "relative_humidity_2m": [60, null],
                "wind_speed_10m": [8.0, 9.0],
                "precipitation": [0.0, 0.1],
                "surface_pressure": [1008.0, 1007.5],
                "visibility": [10000, 9000]
            },
            "daily": {
                "time": ["2025-03-10", "not-a-date"],
                "temperature_2m_max": [33.0, 34.0],
                "temperature_2m_min": [24.0, 25.0],
                "temperature_2m_mean": [null, 29.0],
                "relative_humidity_2m_mean": [65.0, 60.0],
                "wind_speed_10m_max": [12.0, 11.0],
                "precipitation_sum": [1.5, 0.0],
                "precipitation_probability_max": [40, 10],
                "uv_index_max": [7.5, 8.0],
                "weather_code": [61, 1]
            }
        }"#;
        let forecast: Forecast = serde_json::from_str::<ForecastResponse>(raw).unwrap().into();

        assert_eq!(forecast.current.weather_code, 2);
        assert_eq!(forecast.current.wind_speed, 9.0);
        assert_eq!(forecast.hourly_humidity, vec![60.0, 0.0]);
        assert_eq!(forecast.daily.len(), 1);
        assert_eq!(forecast.daily[0].temperature_mean, None);
        assert_eq!(forecast.daily[0].uv_index_max, 7.5);
        assert_eq!(forecast.daily[0].weather_code, 61);
    }
}
