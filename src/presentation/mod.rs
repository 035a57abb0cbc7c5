// Presentation layer - HTTP and WebSocket surface
pub mod ai_handlers;
pub mod app_state;
pub mod handlers;
pub mod live_socket;
pub mod ml_handlers;
pub mod router;
pub mod sensor_handlers;
