// HTTP handlers for the crop recommendation and hyperspectral ML services
use crate::application::error::GatewayError;
use crate::application::gateways::HsiUpload;
use crate::domain::recommendation::AgricultureDataset;
use crate::infrastructure::http_response::error_response;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::json_body;
use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_MAP_MODEL: &str = "ssun";
const DEFAULT_MAP_FILE: &str = "cube.mat";
const MAP_OPTIONS: [&str; 4] = ["time_step", "w", "num_pc", "s1s2"];

pub async fn recommend(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match state.ml_service.recommend(&json_body(&body)).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct DatasetQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub async fn dataset(
    Query(query): Query<DatasetQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let dataset = AgricultureDataset::from_query(query.kind.as_deref());
    match state.ml_service.dataset(dataset).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn latest_recommendation(State(state): State<Arc<AppState>>) -> Response {
    match state.ml_service.latest().await {
        Ok(latest) => Json(latest).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn lstm_map(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match state.ml_service.lstm_map(json_body(&body)).await {
        Ok(map) => Json(map).into_response(),
        Err(e) => e.into_response(),
    }
}

fn multipart_error(e: impl std::fmt::Display) -> GatewayError {
    GatewayError::BadRequest(format!("Invalid multipart body: {}", e))
}

/// Collects the upload form into an [`HsiUpload`]. `Ok(None)` means no file part.
async fn read_upload(mut multipart: Multipart) -> Result<Option<HsiUpload>, GatewayError> {
    let mut file = None;
    let mut model = None;
    let mut options = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_MAP_FILE)
                    .to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, content_type, data));
            }
            "model" => model = Some(field.text().await.map_err(multipart_error)?),
            other if MAP_OPTIONS.contains(&other) => {
                let value = field.text().await.map_err(multipart_error)?;
                options.push((other.to_string(), value));
            }
            _ => {}
        }
    }

    Ok(file.map(|(file_name, content_type, data)| HsiUpload {
        file_name,
        content_type,
        data,
        model: model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MAP_MODEL.to_string()),
        options,
    }))
}

pub async fn upload_map(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, "Missing file"),
        Err(e) => return e.into_response(),
    };

    tracing::info!(
        file = %upload.file_name,
        model = %upload.model,
        bytes = upload.data.len(),
        "Forwarding hyperspectral upload"
    );
    match state.ml_service.upload_map(upload).await {
        Ok(map) => Json(map).into_response(),
        Err(e) => e.into_response(),
    }
}
