// In-memory port implementations for service tests
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::application::error::GatewayError;
use crate::application::gateways::{
    GenerationRequest, GenerativeModel, Geocoder, SmsSender, WeatherSource,
};
use crate::application::telemetry_repository::{Channel, FeedRepository};
use crate::domain::location::{Coordinates, GeocodeCandidate};
use crate::domain::telemetry::Feed;
use crate::domain::weather::{CurrentWeather, DailyWeather, Forecast};

pub fn feed(fields: &[(u8, &str)]) -> Feed {
    let mut feed = Feed::default();
    for (index, value) in fields {
        let value = Some(value.to_string());
        match index {
            1 => feed.field1 = value,
            2 => feed.field2 = value,
            3 => feed.field3 = value,
            4 => feed.field4 = value,
            5 => feed.field5 = value,
            6 => feed.field6 = value,
            7 => feed.field7 = value,
            8 => feed.field8 = value,
            _ => {}
        }
    }
    feed
}

pub enum WriteMode {
    Accept(String),
    RateLimited,
}

pub struct FakeFeeds {
    channels: Vec<(Channel, Vec<Feed>)>,
    reads: Mutex<Vec<(Channel, u32)>>,
    writes: Mutex<Vec<(u8, u8)>>,
    mode: WriteMode,
}

impl Default for FakeFeeds {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            reads: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            mode: WriteMode::Accept("1".to_string()),
        }
    }
}

impl FakeFeeds {
    pub fn with(mut self, channel: Channel, feeds: Vec<Feed>) -> Self {
        self.channels.push((channel, feeds));
        self
    }

    pub fn writing(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn reads(&self) -> Vec<(Channel, u32)> {
        self.reads.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedRepository for FakeFeeds {
    async fn feeds(&self, channel: Channel, results: u32) -> Result<Vec<Feed>, GatewayError> {
        self.reads.lock().unwrap().push((channel, results));
        let feeds = self
            .channels
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, feeds)| feeds.clone())
            .unwrap_or_default();
        let skip = feeds.len().saturating_sub(results as usize);
        Ok(feeds.into_iter().skip(skip).collect())
    }

    async fn write_field(&self, field: u8, value: u8) -> Result<String, GatewayError> {
        self.writes.lock().unwrap().push((field, value));
        match &self.mode {
            WriteMode::Accept(entry_id) => Ok(entry_id.clone()),
            WriteMode::RateLimited => Err(GatewayError::RateLimited {
                service: "ThingSpeak",
            }),
        }
    }
}

/// Forecast for 2025-03-10 12:30 with 65% humidity all day and daily rows
/// from March 3rd to 16th.
pub fn sample_forecast() -> Forecast {
    let day = |d: u32| DailyWeather {
        date: NaiveDate::from_ymd_opt(2025, 3, d).unwrap(),
        temperature_max: 33.0,
        temperature_min: 23.0,
        temperature_mean: Some(28.0),
        humidity_mean: Some(60.0),
        wind_speed_max: 10.0,
        precipitation_sum: 0.0,
        precipitation_probability_max: 10.0,
        uv_index_max: 6.0,
        weather_code: 1,
    };
    Forecast {
        current: CurrentWeather {
            time: "2025-03-10T12:30".to_string(),
            temperature: 29.0,
            wind_speed: 8.0,
            weather_code: 1,
        },
        hourly_time: (0..24).map(|h| format!("2025-03-10T{:02}:00", h)).collect(),
        hourly_temperature: vec![29.0; 24],
        hourly_humidity: vec![65.0; 24],
        hourly_wind_speed: vec![8.0; 24],
        hourly_precipitation: vec![0.0; 24],
        hourly_pressure: vec![1010.0; 24],
        hourly_visibility: vec![20_000.0; 24],
        daily: (3..=16).map(day).collect(),
    }
}

pub struct FakeWeather {
    forecast: Option<Forecast>,
}

impl FakeWeather {
    pub fn new(forecast: Forecast) -> Self {
        Self {
            forecast: Some(forecast),
        }
    }

    pub fn failing() -> Self {
        Self { forecast: None }
    }
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn forecast(&self, _at: Coordinates) -> Result<Forecast, GatewayError> {
        self.forecast
            .clone()
            .ok_or_else(|| GatewayError::upstream("Open-Meteo", 503, "unavailable"))
    }
}

pub struct FakeGeocoder {
    result: Option<Option<GeocodeCandidate>>,
}

impl FakeGeocoder {
    pub fn found(candidate: GeocodeCandidate) -> Self {
        Self {
            result: Some(Some(candidate)),
        }
    }

    pub fn empty() -> Self {
        Self { result: Some(None) }
    }

    pub fn failing() -> Self {
        Self { result: None }
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn reverse(&self, _at: Coordinates) -> Result<Option<GeocodeCandidate>, GatewayError> {
        self.result
            .clone()
            .ok_or_else(|| GatewayError::Config("OpenCage API key is not configured".to_string()))
    }
}

#[derive(Default)]
pub struct FakeSms {
    pub fail: bool,
    pub sent: Mutex<Vec<String>>,
}

impl FakeSms {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsSender for FakeSms {
    async fn send(&self, body: &str) -> Result<(), GatewayError> {
        if self.fail {
            return Err(GatewayError::upstream("Twilio", 401, "Authenticate"));
        }
        self.sent.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

/// Answers generation requests from a script, in order. An exhausted script
/// fails every further call.
#[derive(Default)]
pub struct FakeModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeModel {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(GatewayError::upstream("Gemini", 500, &message)),
            None => Err(GatewayError::upstream("Gemini", 429, "quota exceeded")),
        }
    }
}
