// HTTP handlers for the Balaram AI assistant
use crate::application::assistant_service::ChatRequest;
use crate::application::error::GatewayError;
use crate::presentation::app_state::AppState;
use crate::presentation::sensor_handlers::LocationQuery;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(flatten)]
    request: ChatRequest,
    lat: Option<f64>,
    lon: Option<f64>,
}

pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let body: ChatBody = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            return GatewayError::BadRequest(format!("Invalid chat request: {}", e)).into_response();
        }
    };
    let at = LocationQuery {
        lat: body.lat,
        lon: body.lon,
    }
    .or(state.default_location);

    let context = state.sensor_service.context(at).await;
    match state.assistant_service.chat(&body.request, &context).await {
        Ok(response) => Json(json!({ "response": response })).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    #[serde(default)]
    query: String,
    #[serde(default)]
    response: String,
    search_results: Option<Value>,
    lat: Option<f64>,
    lon: Option<f64>,
}

pub async fn analyze(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let body: AnalyzeBody = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            return GatewayError::BadRequest(format!("Invalid analysis request: {}", e))
                .into_response();
        }
    };
    let at = LocationQuery {
        lat: body.lat,
        lon: body.lon,
    }
    .or(state.default_location);

    let context = state.sensor_service.context(at).await;
    let result = state
        .assistant_service
        .analyze(
            &body.query,
            &body.response,
            body.search_results.as_ref(),
            &context,
            chrono::Local::now().date_naive(),
        )
        .await;
    Json(result).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_body_flattens_request() {
        let body: ChatBody = serde_json::from_value(json!({
            "message": "how is my soil?",
            "systemPrompt": "be brief",
            "lat": 12.5,
            "lon": 77.1
        }))
        .unwrap();
        assert_eq!(body.request.message, "how is my soil?");
        assert_eq!(body.request.system_prompt.as_deref(), Some("be brief"));
        assert_eq!(body.lat, Some(12.5));
        assert!(body.request.attachment.is_none());
    }

    #[test]
    fn test_analyze_body_defaults() {
        let body: AnalyzeBody = serde_json::from_value(json!({ "query": "rain" })).unwrap();
        assert_eq!(body.response, "");
        assert!(body.search_results.is_none());
    }
}
