// Domain layer - Pure models and rules, no I/O
pub mod alert;
pub mod chart;
pub mod knowledge;
pub mod language;
pub mod live;
pub mod location;
pub mod pump;
pub mod recommendation;
pub mod sensor_context;
pub mod telemetry;
pub mod weather;
