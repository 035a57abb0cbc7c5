use anyhow::{Context, bail};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::location::Coordinates;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub thingspeak: ThingSpeakSettings,
    pub gemini: GeminiSettings,
    pub twilio: TwilioSettings,
    pub opencage: OpenCageSettings,
    pub open_meteo: OpenMeteoSettings,
    pub ml: MlSettings,
    pub google: GoogleSettings,
    pub omnidim: OmnidimSettings,
    pub location: LocationSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub address: String,
    /// Default timeout for upstream HTTP calls.
    pub upstream_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".to_string(),
            upstream_timeout_secs: 30,
        }
    }
}

impl ServerSettings {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThingSpeakSettings {
    pub base_url: String,
    pub channel_id: String,
    pub read_api_key: Option<String>,
    pub write_api_key: Option<String>,
    /// Channel the pump state is read from; the sensor channel when unset.
    pub pump_channel_id: Option<String>,
    pub pump_field: u8,
    pub vital_channel_id: Option<String>,
    pub vital_read_api_key: Option<String>,
}

impl Default for ThingSpeakSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.thingspeak.com".to_string(),
            channel_id: String::new(),
            read_api_key: None,
            write_api_key: None,
            pump_channel_id: None,
            pump_field: 7,
            vital_channel_id: None,
            vital_read_api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub base_url: String,
    pub live_url: String,
    pub chat_model: String,
    pub analysis_model: String,
    pub transcription_model: String,
    pub live_model: String,
    pub diagnostics_model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            project_id: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            live_url: "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1alpha.GenerativeService.BidiGenerateContent".to_string(),
            chat_model: "models/gemini-2.0-flash-exp".to_string(),
            analysis_model: "models/gemini-2.0-flash-exp".to_string(),
            transcription_model: "models/gemini-2.0-flash".to_string(),
            live_model: "models/gemini-2.5-flash-native-audio-preview-12-2025".to_string(),
            diagnostics_model: "models/gemini-2.0-flash-exp".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TwilioSettings {
    pub base_url: String,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from_number: Option<String>,
    /// The farmer's phone.
    pub to_number: Option<String>,
}

impl Default for TwilioSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.twilio.com".to_string(),
            account_sid: None,
            auth_token: None,
            from_number: None,
            to_number: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpenCageSettings {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for OpenCageSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.opencagedata.com/geocode/v1/json".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpenMeteoSettings {
    pub base_url: String,
}

impl Default for OpenMeteoSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MlSettings {
    pub recommendation_url: String,
    pub hsi_url: String,
    /// Hyperspectral maps take a while to compute.
    pub timeout_secs: u64,
    /// Largest hyperspectral cube accepted by `/api/ml/hsi/upload-map`.
    pub max_upload_mb: usize,
}

impl Default for MlSettings {
    fn default() -> Self {
        Self {
            recommendation_url: "http://localhost:8000".to_string(),
            hsi_url: "http://localhost:8001".to_string(),
            timeout_secs: 120,
            max_upload_mb: 256,
        }
    }
}

impl MlSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GoogleSettings {
    pub translate_url: String,
    pub tts_url: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            translate_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            tts_url: "https://translate.google.com/translate_tts".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OmnidimSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
    pub from_number_id: Option<String>,
}

impl Default for OmnidimSettings {
    fn default() -> Self {
        Self {
            base_url: "https://backend.omnidim.io".to_string(),
            api_key: None,
            agent_id: None,
            from_number_id: None,
        }
    }
}

/// Farm position used when a request carries no coordinates.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LocationSettings {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        let at = Coordinates::default();
        Self {
            latitude: at.latitude,
            longitude: at.longitude,
        }
    }
}

impl LocationSettings {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=8).contains(&self.thingspeak.pump_field) {
            bail!(
                "Invalid thingspeak.pump_field {}. It must be an integer between 1 and 8.",
                self.thingspeak.pump_field
            );
        }
        Ok(())
    }
}

/// `FARM__SECTION__KEY` variables. Values stay strings so phone numbers keep
/// their `+`; numeric fields are converted during deserialization.
fn environment() -> config::Environment {
    config::Environment::with_prefix("FARM")
        .prefix_separator("__")
        .separator("__")
}

/// Loads `config/gateway.toml` when present, overlaid by `FARM__SECTION__KEY`
/// environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_from(environment())
}

fn load_from(environment: config::Environment) -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/gateway").required(false))
        .add_source(environment)
        .build()
        .context("Failed to read gateway configuration")?;

    let settings: Settings = settings
        .try_deserialize()
        .context("Invalid gateway configuration")?;
    settings.validate()?;
    Ok(settings)
}

/// Non-empty trimmed value of an optional secret.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
