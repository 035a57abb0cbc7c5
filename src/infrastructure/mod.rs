// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod gemini_client;
pub mod gemini_live;
pub mod google_language;
pub mod http_response;
pub mod ml_client;
pub mod omnidim_client;
pub mod open_meteo_client;
pub mod opencage_client;
pub mod thingspeak_repository;
pub mod twilio_client;
pub mod wav;
