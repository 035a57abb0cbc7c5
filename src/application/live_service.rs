// Live service - Bridges a browser voice session to the Gemini realtime API
use crate::application::assistant_service::AssistantService;
use crate::application::error::GatewayError;
use crate::application::gateways::{LiveConnection, LiveConnector, LiveUpstreamEvent};
use crate::domain::live::{
    ClientEvent, ClientMessage, PCM_MIME_TYPE, PcmChunk, PlaybackEvent, PlaybackQueue,
    ServerFrame, TurnState, media_frame, setup_frame,
};
use crate::domain::sensor_context::SensorContext;
use crate::infrastructure::wav::pcm_to_wav_base64;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const AUDIO_ONLY_RESPONSE: &str = "Audio response provided";

#[derive(Clone)]
pub struct LiveService {
    connector: Arc<dyn LiveConnector>,
    assistant: AssistantService,
    reconnect_delay: Duration,
}

/// How an upstream connection ended.
enum SessionEnd {
    ClientGone,
    Upstream { clean: bool, ready: bool },
}

/// Per-browser state that outlives individual upstream connections.
struct Bridge {
    context: SensorContext,
    client_tx: mpsc::Sender<ClientEvent>,
    playback: PlaybackQueue,
    turn: TurnState,
    finished_tx: mpsc::Sender<u64>,
}

impl LiveService {
    pub fn new(connector: Arc<dyn LiveConnector>, assistant: AssistantService) -> Self {
        Self {
            connector,
            assistant,
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Runs one browser session until the browser leaves or the upstream
    /// closes for good. Unclean closes after setup reconnect after a flat
    /// delay.
    pub async fn run(
        &self,
        context: SensorContext,
        mut client_rx: mpsc::Receiver<ClientMessage>,
        client_tx: mpsc::Sender<ClientEvent>,
    ) -> Result<(), GatewayError> {
        let setup = setup_frame(self.connector.model(), &context.variables()).to_string();
        let (finished_tx, mut finished_rx) = mpsc::channel(32);
        let mut bridge = Bridge {
            context,
            client_tx,
            playback: PlaybackQueue::default(),
            turn: TurnState::default(),
            finished_tx,
        };

        loop {
            let connection = match self.connector.connect().await {
                Ok(connection) => connection,
                Err(e) => {
                    tracing::warn!("Live upstream connection failed: {}", e);
                    bridge.emit(ClientEvent::Error { message: e.to_string() }).await;
                    return Err(e);
                }
            };
            tracing::info!(model = self.connector.model(), "Live session connected");

            let end = self
                .session(connection, &setup, &mut bridge, &mut client_rx, &mut finished_rx)
                .await?;
            match end {
                SessionEnd::ClientGone => return Ok(()),
                SessionEnd::Upstream { clean: false, ready: true } => {
                    tracing::warn!(
                        "Live upstream closed unexpectedly, reconnecting in {:?}",
                        self.reconnect_delay
                    );
                    let events = bridge.playback.interrupt();
                    bridge.play(events).await;
                    bridge.turn.take();
                    tokio::time::sleep(self.reconnect_delay).await;
                }
                SessionEnd::Upstream { clean, .. } => {
                    tracing::info!(clean, "Live upstream closed");
                    return Ok(());
                }
            }
        }
    }

    async fn session(
        &self,
        mut connection: LiveConnection,
        setup: &str,
        bridge: &mut Bridge,
        client_rx: &mut mpsc::Receiver<ClientMessage>,
        finished_rx: &mut mpsc::Receiver<u64>,
    ) -> Result<SessionEnd, GatewayError> {
        send_upstream(&connection.outbound, setup.to_string()).await?;
        let mut ready = false;

        loop {
            tokio::select! {
                biased;

                message = client_rx.recv() => match message {
                    None => return Ok(SessionEnd::ClientGone),
                    Some(ClientMessage::Media { mime_type, data }) => {
                        if ready {
                            send_upstream(&connection.outbound, media_frame(&mime_type, &data).to_string()).await?;
                        } else {
                            tracing::debug!("Dropping media chunk received before setup completed");
                        }
                    }
                    Some(ClientMessage::Interrupt) => {
                        let events = bridge.playback.interrupt();
                        bridge.play(events).await;
                    }
                },
                event = connection.inbound.recv() => match event {
                    Some(LiveUpstreamEvent::Frame(raw)) => {
                        if self.handle_frame(&raw, bridge).await {
                            ready = true;
                        }
                    }
                    Some(LiveUpstreamEvent::Closed { clean }) => {
                        return Ok(SessionEnd::Upstream { clean, ready });
                    }
                    None => return Ok(SessionEnd::Upstream { clean: false, ready }),
                },
                Some(sequence) = finished_rx.recv() => {
                    let events = bridge.playback.finish(sequence);
                    bridge.play(events).await;
                }
            }
        }
    }

    /// Returns true when the frame completed setup.
    async fn handle_frame(&self, raw: &str, bridge: &mut Bridge) -> bool {
        let frame = match ServerFrame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Ignoring unparsable live frame: {}", e);
                return false;
            }
        };

        if frame.setup_complete {
            bridge.emit(ClientEvent::SetupComplete).await;
        }

        if let Some(grounding) = frame.grounding {
            bridge.turn.search_results = Some(grounding.clone());
            bridge.emit(ClientEvent::SearchResults { results: grounding }).await;
        }

        for data in &frame.audio {
            match PcmChunk::decode(data) {
                Ok(chunk) => {
                    bridge.turn.pcm.extend_from_slice(&chunk.bytes);
                    let events = bridge.playback.push(chunk);
                    bridge.play(events).await;
                }
                Err(e) => tracing::warn!("Dropping undecodable audio chunk: {}", e),
            }
        }

        for text in frame.text {
            bridge.turn.agent_text.push_str(&text);
            bridge.emit(ClientEvent::Text { text }).await;
        }

        if frame.turn_complete {
            let turn = bridge.turn.take();
            if turn.has_audio() {
                tokio::spawn(complete_turn(
                    self.assistant.clone(),
                    bridge.context.clone(),
                    turn,
                    bridge.client_tx.clone(),
                ));
            }
        }

        frame.setup_complete
    }
}

impl Bridge {
    async fn emit(&self, event: ClientEvent) {
        let _ = self.client_tx.send(event).await;
    }

    /// Forwards playback events and schedules the end of each started chunk.
    async fn play(&self, events: Vec<PlaybackEvent>) {
        for event in events {
            match event {
                PlaybackEvent::Playing(playing) => self.emit(ClientEvent::Playing { playing }).await,
                PlaybackEvent::Start {
                    sequence,
                    chunk,
                    level,
                    duration,
                } => {
                    self.emit(ClientEvent::Audio {
                        mime_type: PCM_MIME_TYPE,
                        data: chunk.data,
                    })
                    .await;
                    self.emit(ClientEvent::AudioLevel { level }).await;

                    let finished_tx = self.finished_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(duration).await;
                        let _ = finished_tx.send(sequence).await;
                    });
                }
            }
        }
    }
}

async fn send_upstream(outbound: &mpsc::Sender<String>, frame: String) -> Result<(), GatewayError> {
    outbound
        .send(frame)
        .await
        .map_err(|_| GatewayError::Internal("Live upstream writer closed".to_string()))
}

/// Transcribes a finished turn and sends the transcript and any chart to the
/// browser.
async fn complete_turn(
    assistant: AssistantService,
    context: SensorContext,
    turn: TurnState,
    client_tx: mpsc::Sender<ClientEvent>,
) {
    let wav = match pcm_to_wav_base64(&turn.pcm) {
        Ok(wav) => wav,
        Err(e) => {
            tracing::error!("Failed to package turn audio: {}", e);
            return;
        }
    };

    let transcription = match assistant.transcribe(wav).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Turn transcription failed: {}", e);
            return;
        }
    };
    tracing::debug!(chars = transcription.len(), "Turn transcribed");
    let _ = client_tx
        .send(ClientEvent::Transcription {
            text: transcription.clone(),
        })
        .await;
    if transcription.is_empty() {
        return;
    }

    let response = if turn.agent_text.is_empty() {
        AUDIO_ONLY_RESPONSE
    } else {
        turn.agent_text.as_str()
    };
    let today = chrono::Local::now().date_naive();
    let analysis = assistant
        .analyze(&transcription, response, turn.search_results.as_ref(), &context, today)
        .await;
    if analysis.needs_visual && !analysis.skip {
        let _ = client_tx.send(ClientEvent::Chart { analysis }).await;
    }
}
