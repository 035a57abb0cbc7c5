// Route table for the gateway
use crate::presentation::app_state::AppState;
use crate::presentation::{ai_handlers, handlers, live_socket, ml_handlers, sensor_handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub fn build_router(state: Arc<AppState>) -> Router {
    let ml = Router::new()
        .route(
            "/agriculture/recommendation",
            get(ml_handlers::dataset).post(ml_handlers::recommend),
        )
        .route(
            "/agriculture/recommendation/latest",
            get(ml_handlers::latest_recommendation),
        )
        .route("/hsi/lstm-map", post(ml_handlers::lstm_map))
        .route(
            "/hsi/upload-map",
            post(ml_handlers::upload_map).layer(DefaultBodyLimit::max(state.upload_limit)),
        );

    let sensors = Router::new()
        .route("/soil-moisture", get(sensor_handlers::soil_moisture))
        .route("/history", get(sensor_handlers::sensor_history))
        .route("/npk", get(sensor_handlers::npk_history))
        .route("/npk/current", get(sensor_handlers::npk_current))
        .route("/vital-stats", get(sensor_handlers::vital_stats))
        .route("/context", get(sensor_handlers::sensor_context));

    let api = Router::new()
        .route("/pump", get(handlers::pump_status).post(handlers::set_pump))
        .route("/pump/auto", post(handlers::auto_pump))
        .route("/alerts", post(handlers::send_alerts))
        .route("/translate", post(handlers::translate))
        .route("/tts", post(handlers::text_to_speech))
        .route("/language/detect", post(handlers::detect_language))
        .route("/language/prompts", get(handlers::language_prompts))
        .route("/omnidim/call", post(handlers::start_call))
        .route("/diagnostics/balaram-ai", get(handlers::diagnostics))
        .route("/weather", get(sensor_handlers::current_weather))
        .route("/weather/detailed", get(sensor_handlers::detailed_weather))
        .route("/location", get(sensor_handlers::location))
        .route("/ai/chat", post(ai_handlers::chat))
        .route("/ai/analyze", post(ai_handlers::analyze))
        .route("/live", get(live_socket::live_session))
        .nest("/ml", ml)
        .nest("/sensors", sensors);

    Router::new()
        .route("/healthz", get(handlers::health_check))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
