// Application layer - Use cases over the upstream ports
pub mod alert_service;
pub mod assistant_service;
pub mod call_service;
pub mod diagnostics_service;
pub mod error;
pub mod gateways;
pub mod language_service;
pub mod live_service;
pub mod location_service;
pub mod ml_service;
pub mod pump_service;
pub mod sensor_service;
pub mod telemetry_repository;
#[cfg(test)]
pub mod testing;
pub mod weather_service;
