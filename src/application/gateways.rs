// Ports for the remaining upstream services
use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::application::error::GatewayError;
use crate::domain::location::{Coordinates, GeocodeCandidate};
use crate::domain::recommendation::{AgricultureDataset, RecommendationRequest};
use crate::domain::weather::Forecast;

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn forecast(&self, at: Coordinates) -> Result<Forecast, GatewayError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// First reverse-geocoding candidate, `None` when the service found nothing.
    async fn reverse(&self, at: Coordinates) -> Result<Option<GeocodeCandidate>, GatewayError>;
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, body: &str) -> Result<(), GatewayError>;
}

#[async_trait]
pub trait CallDispatcher: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn dispatch(&self, to: &str, call_context: Option<Value>) -> Result<Value, GatewayError>;
}

/// Multipart hyperspectral upload forwarded to the ML service.
#[derive(Debug, Clone)]
pub struct HsiUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
    pub model: String,
    /// Optional `time_step`, `w`, `num_pc` and `s1s2` form fields.
    pub options: Vec<(String, String)>,
}

#[async_trait]
pub trait MlGateway: Send + Sync {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Value, GatewayError>;

    async fn dataset(&self, dataset: AgricultureDataset) -> Result<Value, GatewayError>;

    async fn lstm_map(&self, body: Value) -> Result<Value, GatewayError>;

    async fn upload_map(&self, upload: HsiUpload) -> Result<Value, GatewayError>;
}

#[async_trait]
pub trait TranslationGateway: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, GatewayError>;

    /// MP3 audio for one chunk of at most 200 characters.
    async fn speech_chunk(
        &self,
        text: &str,
        lang: &str,
        index: usize,
        total: usize,
    ) -> Result<Bytes, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    InlineData { mime_type: String, data: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub parts: Vec<ContentPart>,
    pub config: Option<GenerationConfig>,
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Text of the first candidate.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GatewayError>;
}

/// Raw outcome of one diagnostics probe. `status` is `None` on network errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeOutcome {
    pub status: Option<u16>,
    pub body: String,
    pub rate_limit: BTreeMap<String, String>,
    pub transport_error: Option<String>,
}

impl ProbeOutcome {
    pub fn ok(&self) -> bool {
        self.status.is_some_and(|s| (200..300).contains(&s))
    }
}

#[async_trait]
pub trait ModelDiagnostics: Send + Sync {
    fn api_key(&self) -> Option<&str>;

    fn project_id(&self) -> Option<&str>;

    fn target_model(&self) -> &str;

    async fn list_models(&self) -> ProbeOutcome;

    async fn ping(&self, model: &str) -> ProbeOutcome;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveUpstreamEvent {
    Frame(String),
    Closed { clean: bool },
}

/// An open realtime session: text frames out, frames and close notices in.
pub struct LiveConnection {
    pub outbound: mpsc::Sender<String>,
    pub inbound: mpsc::Receiver<LiveUpstreamEvent>,
}

#[async_trait]
pub trait LiveConnector: Send + Sync {
    fn model(&self) -> &str;

    async fn connect(&self) -> Result<LiveConnection, GatewayError>;
}
