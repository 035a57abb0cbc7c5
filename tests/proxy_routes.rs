mod common;

use std::collections::HashMap;

use axum::extract::{DefaultBodyLimit, Multipart, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use common::{Recorded, offline_settings, serve, spawn_gateway};
use serde_json::{Value, json};

#[tokio::test]
async fn healthz_is_ok() {
    let base = spawn_gateway(offline_settings()).await;
    let response = reqwest::get(format!("{base}/healthz")).await.expect("request");
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.expect("text"), "ok");
}

#[tokio::test]
async fn recommendation_requires_numeric_readings() {
    let calls = Recorded::default();
    let recorder = calls.clone();
    let ml = Router::new().route(
        "/agriculture/recommendation",
        post(move || {
            let recorder = recorder.clone();
            async move {
                recorder.push("called");
                Json(json!({}))
            }
        }),
    );
    let mut settings = offline_settings();
    settings.ml.recommendation_url = serve(ml).await;
    let base = spawn_gateway(settings).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/ml/agriculture/recommendation"))
        .json(&json!({ "n": 40, "p": "high", "k": 20, "temperature": 28, "humidity": 60 }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 400);
    assert!(calls.entries().is_empty());
}

#[tokio::test]
async fn recommendation_error_status_passes_through() {
    let ml = Router::new().route(
        "/agriculture/recommendation",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["soil_moisture"], Value::Null);
            (StatusCode::UNPROCESSABLE_ENTITY, "crop model rejected input")
        }),
    );
    let mut settings = offline_settings();
    settings.ml.recommendation_url = serve(ml).await;
    let base = spawn_gateway(settings).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/ml/agriculture/recommendation"))
        .json(&json!({ "n": 40, "p": 35, "k": 20, "temperature": 28, "humidity": 60, "soil_moisture": 0 }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body, json!({ "error": "ML service error: crop model rejected input" }));
}

#[tokio::test]
async fn dataset_query_selects_upstream_path() {
    let ml = Router::new()
        .route("/agriculture/npk-ranges", get(|| async { Json(json!({ "rice": [80, 40, 40] })) }))
        .route("/agriculture/statistics", get(|| async { Json(json!({ "rows": 2200 })) }));
    let mut settings = offline_settings();
    settings.ml.recommendation_url = serve(ml).await;
    let base = spawn_gateway(settings).await;

    let ranges: Value = reqwest::get(format!("{base}/api/ml/agriculture/recommendation?type=npk-ranges"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(ranges, json!({ "rice": [80, 40, 40] }));

    let stats: Value = reqwest::get(format!("{base}/api/ml/agriculture/recommendation"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(stats, json!({ "rows": 2200 }));
}

#[tokio::test]
async fn lstm_map_failure_is_bad_gateway_and_text_is_wrapped() {
    let hsi = Router::new().route(
        "/hsi/lstm-map",
        post(|Json(body): Json<Value>| async move {
            if body["fail"] == json!(true) {
                (StatusCode::INTERNAL_SERVER_ERROR, "model crashed".to_string())
            } else {
                (StatusCode::OK, "map rendered".to_string())
            }
        }),
    );
    let mut settings = offline_settings();
    settings.ml.hsi_url = serve(hsi).await;
    let base = spawn_gateway(settings).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/ml/hsi/lstm-map"))
        .json(&json!({ "fail": true }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body, json!({ "error": "ML service error 500: model crashed" }));

    let body: Value = client
        .post(format!("{base}/api/ml/hsi/lstm-map"))
        .json(&json!({ "fail": false }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body, json!({ "raw": "map rendered" }));
}

#[tokio::test]
async fn upload_map_requires_file() {
    let base = spawn_gateway(offline_settings()).await;
    let form = reqwest::multipart::Form::new().text("model", "ssun");

    let response = reqwest::Client::new()
        .post(format!("{base}/api/ml/hsi/upload-map"))
        .multipart(form)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body, json!({ "error": "Missing file" }));
}

#[tokio::test]
async fn upload_map_forwards_large_cubes() {
    let hsi = Router::new().route(
        "/hsi/upload-map",
        post(|mut multipart: Multipart| async move {
            let mut received = serde_json::Map::new();
            while let Some(field) = multipart.next_field().await.expect("field") {
                let name = field.name().unwrap_or_default().to_string();
                if name == "file" {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let size = field.bytes().await.expect("file bytes").len();
                    received.insert("fileName".into(), json!(file_name));
                    received.insert("bytes".into(), json!(size));
                } else {
                    received.insert(name, json!(field.text().await.expect("text")));
                }
            }
            Json(Value::Object(received))
        })
        .layer(DefaultBodyLimit::disable()),
    );
    let mut settings = offline_settings();
    settings.ml.hsi_url = serve(hsi).await;
    let base = spawn_gateway(settings).await;

    let cube = vec![7u8; 3 * 1024 * 1024];
    let form = reqwest::multipart::Form::new()
        .text("model", "ssun")
        .text("num_pc", "15")
        .part(
            "file",
            reqwest::multipart::Part::bytes(cube).file_name("indian_pines.mat"),
        );
    let response = reqwest::Client::new()
        .post(format!("{base}/api/ml/hsi/upload-map"))
        .multipart(form)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["bytes"], json!(3 * 1024 * 1024));
    assert_eq!(body["fileName"], json!("indian_pines.mat"));
    assert_eq!(body["model"], json!("ssun"));
    assert_eq!(body["num_pc"], json!("15"));
}

fn fake_opencage() -> Router {
    Router::new().route(
        "/geocode",
        get(|Query(query): Query<HashMap<String, String>>| async move {
            assert_eq!(query.get("key").map(String::as_str), Some("oc-key"));
            Json(json!({
                "results": [{
                    "geometry": { "lat": 22.5660, "lng": 88.3650 },
                    "components": { "city": "Kolkata", "state": "West Bengal", "country": "India" }
                }]
            }))
        }),
    )
}

#[tokio::test]
async fn location_name_only_for_nearby_results() {
    let mut settings = offline_settings();
    settings.opencage.base_url = format!("{}/geocode", serve(fake_opencage()).await);
    settings.opencage.api_key = Some("oc-key".to_string());
    let base = spawn_gateway(settings).await;

    let near: Value = reqwest::get(format!("{base}/api/location?lat=22.5626&lon=88.363"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(near["name"], json!("Kolkata, West Bengal, India"));

    let far: Value = reqwest::get(format!("{base}/api/location?lat=12.9716&lon=77.5946"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(far["name"], json!("Coordinates: 12.971600°, 77.594600°"));
}

#[tokio::test]
async fn location_without_key_uses_coordinates() {
    let base = spawn_gateway(offline_settings()).await;
    let body: Value = reqwest::get(format!("{base}/api/location?lat=10.5&lon=76.25"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["name"], json!("Coordinates: 10.500000°, 76.250000°"));
}

#[tokio::test]
async fn analyze_falls_back_when_model_answer_is_not_a_chart() {
    let gemini = Router::new().route(
        "/models/:action",
        post(|| async {
            Json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "Sorry, no chart today." }] } }]
            }))
        }),
    );
    let mut settings = offline_settings();
    settings.gemini.base_url = serve(gemini).await;
    settings.gemini.api_key = Some("gm-key".to_string());
    let base = spawn_gateway(settings).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/ai/analyze"))
        .json(&json!({
            "query": "show my soil moisture trend this week",
            "response": "Moisture held around 42% all week."
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["skip"], json!(false));
    assert_eq!(body["needs_visual"], json!(true));
    assert_eq!(body["topic"], json!("soil_moisture"));
    assert_eq!(body["chart_data"]["labels"].as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn analyze_skips_small_talk() {
    let base = spawn_gateway(offline_settings()).await;
    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/ai/analyze"))
        .json(&json!({ "query": "hello there", "response": "Namaste! How can I help?" }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["skip"], json!(true));
    assert_eq!(body["needs_visual"], json!(false));
}

#[tokio::test]
async fn translate_validates_body() {
    let base = spawn_gateway(offline_settings()).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/translate"))
        .json(&json!({ "text": "water the field" }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body, json!({ "error": "Text and targetLang are required" }));
}

#[tokio::test]
async fn omnidim_call_without_config_is_500() {
    let base = spawn_gateway(offline_settings()).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/omnidim/call"))
        .json(&json!({ "to": "+919000000000" }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 500);
}
