mod common;

use std::time::Duration;

use axum::Router;
use axum::extract::ws::{CloseFrame, Message as AxumMessage, WebSocket, WebSocketUpgrade, close_code};
use axum::routing::get;
use common::{Recorded, offline_settings, serve, spawn_gateway};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

/// Gemini Live stand-in: acknowledges setup, waits for one media chunk,
/// answers with text and closes normally.
async fn fake_live_session(mut socket: WebSocket, frames: Recorded) {
    let Some(Ok(AxumMessage::Text(setup))) = socket.recv().await else {
        return;
    };
    frames.push(setup);
    socket
        .send(AxumMessage::Text(json!({ "setupComplete": {} }).to_string()))
        .await
        .expect("send setupComplete");

    let Some(Ok(AxumMessage::Text(media))) = socket.recv().await else {
        return;
    };
    frames.push(media);
    socket
        .send(AxumMessage::Text(
            json!({
                "serverContent": {
                    "modelTurn": { "parts": [{ "text": "Your soil looks healthy." }] },
                    "turnComplete": true
                }
            })
            .to_string(),
        ))
        .await
        .expect("send text");
    let _ = socket
        .send(AxumMessage::Close(Some(CloseFrame {
            code: close_code::NORMAL,
            reason: "".into(),
        })))
        .await;
}

#[tokio::test]
async fn live_session_relays_setup_media_and_text() {
    let frames = Recorded::default();
    let recorder = frames.clone();
    let upstream = Router::new().route(
        "/live",
        get(move |ws: WebSocketUpgrade| {
            let recorder = recorder.clone();
            async move { ws.on_upgrade(move |socket| fake_live_session(socket, recorder)) }
        }),
    );
    let upstream = serve(upstream).await;

    let mut settings = offline_settings();
    settings.gemini.live_url = format!("{}/live", upstream.replace("http://", "ws://"));
    settings.gemini.api_key = Some("live-key".to_string());
    let base = spawn_gateway(settings).await;

    let url = format!("{}/api/live?lat=22.5626&lon=88.363", base.replace("http://", "ws://"));
    let (mut browser, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .expect("connect to gateway");

    let mut events = Vec::new();
    let collect = async {
        while let Some(Ok(message)) = browser.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            let event: Value = serde_json::from_str(&text).expect("event json");
            if event["type"] == json!("setupComplete") {
                browser
                    .send(Message::Text(
                        json!({ "type": "media", "mimeType": "audio/pcm;rate=16000", "data": "AAAA" })
                            .to_string(),
                    ))
                    .await
                    .expect("send media");
            }
            events.push(event);
        }
    };
    tokio::time::timeout(Duration::from_secs(10), collect)
        .await
        .expect("session finished");

    assert_eq!(events[0], json!({ "type": "setupComplete" }));
    assert!(events.contains(&json!({ "type": "text", "text": "Your soil looks healthy." })));

    let upstream_frames = frames.entries();
    assert_eq!(upstream_frames.len(), 2);
    let setup: Value = serde_json::from_str(&upstream_frames[0]).expect("setup json");
    assert_eq!(
        setup["setup"]["model"],
        json!("models/gemini-2.5-flash-native-audio-preview-12-2025")
    );
    let media: Value = serde_json::from_str(&upstream_frames[1]).expect("media json");
    assert_eq!(
        media,
        json!({ "realtime_input": { "media_chunks": [{ "mime_type": "audio/pcm;rate=16000", "data": "AAAA" }] } })
    );
}

#[tokio::test]
async fn live_session_without_key_reports_error() {
    let base = spawn_gateway(offline_settings()).await;
    let url = format!("{}/api/live", base.replace("http://", "ws://"));
    let (mut browser, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .expect("connect to gateway");

    let first = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match browser.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Some(serde_json::from_str::<Value>(&text).expect("event json"));
                }
                Some(Ok(_)) => continue,
                _ => return None,
            }
        }
    })
    .await
    .expect("event before timeout")
    .expect("an event");
    assert_eq!(first["type"], json!("error"));
}

#[tokio::test]
async fn live_session_ends_when_upstream_refuses_with_close_frame() {
    let connections = Recorded::default();
    let recorder = connections.clone();
    let upstream = Router::new().route(
        "/live",
        get(move |ws: WebSocketUpgrade| {
            let recorder = recorder.clone();
            async move {
                ws.on_upgrade(move |mut socket: WebSocket| async move {
                    recorder.push("connected");
                    let _ = socket.recv().await;
                    let _ = socket
                        .send(AxumMessage::Text(json!({ "setupComplete": {} }).to_string()))
                        .await;
                    let _ = socket
                        .send(AxumMessage::Close(Some(CloseFrame {
                            code: close_code::ERROR,
                            reason: "internal error".into(),
                        })))
                        .await;
                })
            }
        }),
    );
    let upstream = serve(upstream).await;

    let mut settings = offline_settings();
    settings.gemini.live_url = format!("{}/live", upstream.replace("http://", "ws://"));
    settings.gemini.api_key = Some("live-key".to_string());
    let base = spawn_gateway(settings).await;

    let url = format!("{}/api/live", base.replace("http://", "ws://"));
    let (mut browser, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .expect("connect to gateway");

    let mut setups = 0;
    tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(Ok(message)) = browser.next().await {
            if let Message::Text(text) = message {
                let event: Value = serde_json::from_str(&text).expect("event json");
                if event["type"] == json!("setupComplete") {
                    setups += 1;
                }
            }
        }
    })
    .await
    .expect("session ended without reconnecting");

    assert_eq!(setups, 1);
    assert_eq!(connections.entries().len(), 1);
}
