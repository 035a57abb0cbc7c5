// HTTP request handlers for devices, alerts, calls, languages and diagnostics
use crate::application::error::GatewayError;
use crate::domain::alert::AlertCheck;
use crate::domain::pump::parse_pump_command;
use crate::infrastructure::http_response::error_response;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

const INVALID_PUMP_STATE: &str = "Invalid state. Use 'ON', 'OFF', 1, or 0";
const PUMP_RATE_LIMITED: &str = "Rate limited by ThingSpeak (wait 15s)";

/// Lenient JSON body: anything unparsable becomes `null`.
pub fn json_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn set_pump(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let Some(pump_state) = parse_pump_command(&json_body(&body)) else {
        return error_response(StatusCode::BAD_REQUEST, INVALID_PUMP_STATE);
    };

    match state.pump_service.set(pump_state).await {
        Ok(entry_id) => Json(json!({
            "success": true,
            "state": pump_state,
            "entryId": entry_id,
        }))
        .into_response(),
        Err(GatewayError::RateLimited { .. }) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "success": false,
                "warning": PUMP_RATE_LIMITED,
                "state": pump_state,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn pump_status(State(state): State<Arc<AppState>>) -> Response {
    match state.pump_service.status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn auto_pump(State(state): State<Arc<AppState>>) -> Response {
    match state.pump_service.auto().await {
        Ok(report) => Json(report).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn send_alerts(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let check: AlertCheck = match serde_json::from_slice(&body) {
        Ok(check) => check,
        Err(e) => {
            return GatewayError::BadRequest(format!("Invalid alert readings: {}", e)).into_response();
        }
    };

    match state.alert_service.dispatch(&check).await {
        Ok(sent) => Json(json!({ "success": true, "alertsSent": sent })).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct CallRequest {
    to: Option<String>,
    #[serde(rename = "phoneNumber")]
    phone_number: Option<String>,
    call_context: Option<Value>,
}

pub async fn start_call(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: CallRequest = serde_json::from_slice(&body).unwrap_or(CallRequest {
        to: None,
        phone_number: None,
        call_context: None,
    });
    let to = request
        .to
        .as_deref()
        .filter(|n| !n.is_empty())
        .or(request.phone_number.as_deref());

    match state.call_service.call(to, request.call_context).await {
        Ok(data) => Json(json!({ "success": true, "data": data })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Non-empty string field of a JSON body.
fn text_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

pub async fn translate(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let body = json_body(&body);
    let (Some(text), Some(target)) = (text_field(&body, "text"), text_field(&body, "targetLang")) else {
        return error_response(StatusCode::BAD_REQUEST, "Text and targetLang are required");
    };

    match state.language_service.translate(text, target).await {
        Ok(translated) => Json(json!({ "translatedText": translated })).into_response(),
        Err(e) => {
            tracing::error!("Translation failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to translate text")
        }
    }
}

pub async fn text_to_speech(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let body = json_body(&body);
    let (Some(text), Some(lang)) = (text_field(&body, "text"), text_field(&body, "lang")) else {
        return error_response(StatusCode::BAD_REQUEST, "Text and language are required");
    };

    match state.language_service.speak(text, lang).await {
        Ok(audio) => Json(json!({ "audioContent": audio })).into_response(),
        Err(e) => {
            tracing::error!("Speech synthesis failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate speech")
        }
    }
}

pub async fn detect_language(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let body = json_body(&body);
    let Some(transcript) = body.get("transcript").and_then(Value::as_str) else {
        return error_response(StatusCode::BAD_REQUEST, "transcript is required");
    };
    Json(json!({ "language": state.language_service.detect(transcript) })).into_response()
}

pub async fn language_prompts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.language_service.prompts())
}

pub async fn diagnostics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.diagnostics_service.run().await)
}
