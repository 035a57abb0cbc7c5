// Application state for HTTP handlers
use crate::application::alert_service::AlertService;
use crate::application::assistant_service::{AssistantService, ModelNames};
use crate::application::call_service::CallService;
use crate::application::diagnostics_service::DiagnosticsService;
use crate::application::language_service::LanguageService;
use crate::application::live_service::LiveService;
use crate::application::location_service::LocationService;
use crate::application::ml_service::MlService;
use crate::application::pump_service::PumpService;
use crate::application::sensor_service::SensorService;
use crate::application::weather_service::WeatherService;
use crate::domain::location::Coordinates;
use crate::infrastructure::config::Settings;
use crate::infrastructure::gemini_client::GeminiClient;
use crate::infrastructure::gemini_live::GeminiLiveConnector;
use crate::infrastructure::google_language::GoogleLanguageClient;
use crate::infrastructure::ml_client::MlClient;
use crate::infrastructure::omnidim_client::OmnidimClient;
use crate::infrastructure::open_meteo_client::OpenMeteoClient;
use crate::infrastructure::opencage_client::OpenCageClient;
use crate::infrastructure::thingspeak_repository::ThingSpeakRepository;
use crate::infrastructure::twilio_client::TwilioClient;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub sensor_service: SensorService,
    pub pump_service: PumpService,
    pub alert_service: AlertService,
    pub ml_service: MlService,
    pub language_service: LanguageService,
    pub call_service: CallService,
    pub diagnostics_service: DiagnosticsService,
    pub assistant_service: AssistantService,
    pub live_service: LiveService,
    pub weather_service: WeatherService,
    pub location_service: LocationService,
    /// Farm position used when a request names none.
    pub default_location: Coordinates,
    /// Body limit for hyperspectral uploads.
    pub upload_limit: usize,
}

fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

impl AppState {
    /// Wires every adapter and service from configuration.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = http_client(settings.server.upstream_timeout())?;
        let ml_client = http_client(Duration::from_secs(settings.ml.timeout_secs))?;

        // Create adapters (infrastructure layer)
        let feeds = Arc::new(ThingSpeakRepository::new(client.clone(), settings.thingspeak.clone()));
        let weather_source = Arc::new(OpenMeteoClient::new(
            client.clone(),
            settings.open_meteo.base_url.clone(),
        ));
        let geocoder = Arc::new(OpenCageClient::new(
            client.clone(),
            settings.opencage.base_url.clone(),
            settings.opencage.api_key.clone(),
        ));
        let gemini = Arc::new(GeminiClient::new(client.clone(), settings.gemini.clone()));

        // Create services (application layer)
        let weather_service = WeatherService::new(weather_source);
        let location_service = LocationService::new(geocoder);
        let sensor_service = SensorService::new(
            feeds.clone(),
            weather_service.clone(),
            location_service.clone(),
        );
        let assistant_service = AssistantService::new(
            gemini.clone(),
            ModelNames {
                chat: settings.gemini.chat_model.clone(),
                analysis: settings.gemini.analysis_model.clone(),
                transcription: settings.gemini.transcription_model.clone(),
            },
        );
        let live_service = LiveService::new(
            Arc::new(GeminiLiveConnector::new(&settings.gemini)),
            assistant_service.clone(),
        );

        Ok(Self {
            pump_service: PumpService::new(feeds, settings.thingspeak.pump_field),
            alert_service: AlertService::new(Arc::new(TwilioClient::new(
                client.clone(),
                settings.twilio.clone(),
            ))),
            ml_service: MlService::new(
                Arc::new(MlClient::new(ml_client, &settings.ml)),
                sensor_service.clone(),
            ),
            language_service: LanguageService::new(Arc::new(GoogleLanguageClient::new(
                client.clone(),
                settings.google.clone(),
            ))),
            call_service: CallService::new(Arc::new(OmnidimClient::new(
                client,
                settings.omnidim.clone(),
            ))),
            diagnostics_service: DiagnosticsService::new(gemini),
            assistant_service,
            live_service,
            sensor_service,
            weather_service,
            location_service,
            default_location: settings.location.coordinates(),
            upload_limit: settings.ml.max_upload_bytes(),
        })
    }
}
