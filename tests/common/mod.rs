#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use farm_telemetry::infrastructure::config::Settings;
use farm_telemetry::presentation::app_state::AppState;
use farm_telemetry::presentation::router::build_router;

/// Nothing listens here; connections are refused immediately.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

/// Settings with every upstream pointed at an unreachable address.
pub fn offline_settings() -> Settings {
    let mut settings = Settings::default();
    settings.server.upstream_timeout_secs = 5;
    settings.thingspeak.base_url = UNREACHABLE.to_string();
    settings.gemini.base_url = UNREACHABLE.to_string();
    settings.gemini.live_url = "ws://127.0.0.1:9".to_string();
    settings.twilio.base_url = UNREACHABLE.to_string();
    settings.opencage.base_url = UNREACHABLE.to_string();
    settings.open_meteo.base_url = UNREACHABLE.to_string();
    settings.ml.recommendation_url = UNREACHABLE.to_string();
    settings.ml.hsi_url = UNREACHABLE.to_string();
    settings.ml.timeout_secs = 5;
    settings.google.translate_url = UNREACHABLE.to_string();
    settings.google.tts_url = UNREACHABLE.to_string();
    settings.omnidim.base_url = UNREACHABLE.to_string();
    settings
}

/// Starts the gateway itself and returns its base URL.
pub async fn spawn_gateway(settings: Settings) -> String {
    let state = AppState::from_settings(&settings).expect("app state");
    serve(build_router(Arc::new(state))).await
}

/// Request log shared between a fake upstream and the test body.
#[derive(Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<String>>>);

impl Recorded {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
