// HTTP handlers for sensor channels, weather and location
use crate::domain::location::Coordinates;
use crate::domain::telemetry::TimeRange;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

impl RangeQuery {
    fn time_range(&self) -> TimeRange {
        TimeRange::parse(self.range.as_deref().unwrap_or("24h"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl LocationQuery {
    /// Requested position, or `default` unless both coordinates are given.
    pub fn or(&self, default: Coordinates) -> Coordinates {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon),
            _ => default,
        }
    }
}

pub async fn soil_moisture(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.sensor_service.soil_moisture(query.time_range()).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn sensor_history(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.sensor_service.history(query.time_range()).await {
        Ok(readings) => Json(readings).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn npk_history(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.sensor_service.npk(query.time_range()).await {
        Ok(readings) => Json(readings).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn npk_current(State(state): State<Arc<AppState>>) -> Response {
    match state.sensor_service.npk_current().await {
        Ok(current) => Json(current).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn vital_stats(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.sensor_service.vital_stats(query.time_range()).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn sensor_context(
    Query(query): Query<LocationQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let context = state
        .sensor_service
        .context(query.or(state.default_location))
        .await;
    Json(json!({
        "context": context,
        "variables": context.variables(),
    }))
}

pub async fn current_weather(
    Query(query): Query<LocationQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state
        .weather_service
        .current(query.or(state.default_location))
        .await
    {
        Ok(weather) => Json(weather).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn detailed_weather(
    Query(query): Query<LocationQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state
        .weather_service
        .detailed(query.or(state.default_location))
        .await
    {
        Ok(weather) => Json(weather).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn location(
    Query(query): Query<LocationQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    Json(
        state
            .location_service
            .resolve(query.or(state.default_location))
            .await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_needs_both_coordinates() {
        let fallback = Coordinates::new(1.0, 2.0);
        let half = LocationQuery {
            lat: Some(10.0),
            lon: None,
        };
        assert_eq!(half.or(fallback), fallback);

        let full = LocationQuery {
            lat: Some(10.0),
            lon: Some(20.0),
        };
        assert_eq!(full.or(fallback), Coordinates::new(10.0, 20.0));
    }

    #[test]
    fn test_range_defaults_to_a_day() {
        assert_eq!(RangeQuery::default().time_range(), TimeRange::Day);
        let week = RangeQuery {
            range: Some("7d".into()),
        };
        assert_eq!(week.time_range(), TimeRange::Week);
    }
}
