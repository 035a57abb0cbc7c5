// Gemini realtime (BidiGenerateContent) WebSocket connector
use crate::application::error::GatewayError;
use crate::application::gateways::{LiveConnection, LiveConnector, LiveUpstreamEvent};
use crate::infrastructure::config::{GeminiSettings, present};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct GeminiLiveConnector {
    url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiLiveConnector {
    pub fn new(settings: &GeminiSettings) -> Self {
        Self {
            url: settings.live_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.live_model.clone(),
        }
    }
}

/// Text payload of an upstream message. Gemini sends JSON in binary frames
/// as well as text frames.
fn frame_text(message: Message) -> Option<String> {
    match message {
        Message::Text(text) => Some(text),
        Message::Binary(data) => String::from_utf8(data).ok(),
        _ => None,
    }
}

#[async_trait]
impl LiveConnector for GeminiLiveConnector {
    fn model(&self) -> &str {
        &self.model
    }

    async fn connect(&self) -> Result<LiveConnection, GatewayError> {
        let key = present(&self.api_key)
            .ok_or_else(|| GatewayError::Config("Missing API key for Balaram AI (Gemini).".to_string()))?;
        let url = format!("{}?key={}", self.url, urlencoding::encode(key));

        let (socket, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| GatewayError::Internal(format!("Gemini live connection failed: {}", e)))?;
        let (mut sink, mut stream) = socket.split();

        let (outbound, mut outbound_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
        let (inbound_tx, inbound) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = sink.send(Message::Text(frame)).await {
                    tracing::warn!("Gemini live send failed: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            let clean = loop {
                match stream.next().await {
                    // Any close handshake ends the session; only a dropped transport reconnects.
                    Some(Ok(Message::Close(frame))) => {
                        let code = frame.as_ref().map(|f| u16::from(f.code));
                        tracing::debug!(?code, "Gemini live closed");
                        break true;
                    }
                    Some(Ok(message)) => {
                        let Some(text) = frame_text(message) else {
                            continue;
                        };
                        if inbound_tx.send(LiveUpstreamEvent::Frame(text)).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!("Gemini live receive failed: {}", e);
                        break false;
                    }
                    None => break false,
                }
            };
            let _ = inbound_tx.send(LiveUpstreamEvent::Closed { clean }).await;
        });

        Ok(LiveConnection { outbound, inbound })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_json_frames_are_text() {
        assert_eq!(
            frame_text(Message::Binary(br#"{"setupComplete":{}}"#.to_vec())).as_deref(),
            Some(r#"{"setupComplete":{}}"#)
        );
        assert_eq!(frame_text(Message::Ping(vec![1])), None);
    }

    #[tokio::test]
    async fn test_connect_without_key_fails_fast() {
        let connector = GeminiLiveConnector::new(&GeminiSettings::default());
        assert!(matches!(connector.connect().await, Err(GatewayError::Config(_))));
    }
}
