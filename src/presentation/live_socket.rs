// WebSocket endpoint bridging a browser voice session to Gemini Live
use crate::domain::live::{ClientEvent, ClientMessage};
use crate::presentation::app_state::AppState;
use crate::presentation::sensor_handlers::LocationQuery;
use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 64;

pub async fn live_session(
    ws: WebSocketUpgrade,
    Query(query): Query<LocationQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| bridge_socket(socket, query, state))
}

async fn bridge_socket(socket: WebSocket, query: LocationQuery, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (event_tx, mut event_rx) = mpsc::channel::<ClientEvent>(CHANNEL_CAPACITY);
    let (message_tx, message_rx) = mpsc::channel::<ClientMessage>(CHANNEL_CAPACITY);

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to encode live event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    if message_tx.send(message).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("Ignoring invalid live message: {}", e),
            }
        }
    });

    let context = state
        .sensor_service
        .context(query.or(state.default_location))
        .await;
    tracing::info!(location = %context.location_name, "Live session opened");

    if let Err(e) = state.live_service.run(context, message_rx, event_tx).await {
        tracing::warn!("Live session ended with error: {}", e);
    }

    // Flush pending events, then drop the browser side.
    if tokio::time::timeout(std::time::Duration::from_secs(1), &mut send_task)
        .await
        .is_err()
    {
        send_task.abort();
    }
    recv_task.abort();
    let _ = (&mut recv_task).await;
    tracing::info!("Live session closed");
}
