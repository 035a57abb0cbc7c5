// Realtime voice session protocol: upstream frames, client events, turn and playback state
use std::collections::VecDeque;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::chart::AnalysisResult;
use super::sensor_context::GeminiVariables;

pub const PCM_MIME_TYPE: &str = "audio/pcm;rate=24000";
pub const SAMPLE_RATE: u32 = 24_000;

pub fn persona_prompt(vars: &GeminiVariables) -> String {
    format!(
        "Speak with a helpful, funny and wise tone, that is very sportive, optimistic and can say no to the user if required. \
You will always be confident in what you say. Ask the user for their query. Sound natural in the language you are speaking, \
do not repeat questions or keep using the user's name, and avoid generic answers: go in depth, bit by bit. \
Do not speak more than 40 words at a time. Vocalise your thinking with the occasional 'ahh' and 'uhh'. \
You are an agriculture expert in India solving farmers' problems. Always converse in the language the user is speaking, or asks to speak. \
You have access to real-time sensor data: Location --> {}, Humidity --> {}%, Soil Moisture --> {}%, \
Nitrogen --> {}ppm N, Phosphorus --> {}ppm P, Potassium --> {}ppm K, Avg NPK: {}ppm. \
Based on these values, the location and the crop the user asks about, give personalized agricultural suggestions and recommendations. \
Say sensor numbers in words, not digits, and always say numbers in English. \
When users ask you to search, find or look up something, or ask for current prices or the latest news, \
use Google Search for real-time information in the Indian context only.",
        vars.location_name,
        vars.humidity,
        vars.soil_moisture,
        vars.npk_nitrogen,
        vars.npk_phosphorus,
        vars.npk_potassium,
        vars.npk_average,
    )
}

/// First frame sent on every upstream connection.
pub fn setup_frame(model: &str, vars: &GeminiVariables) -> Value {
    json!({
        "setup": {
            "model": model,
            "generation_config": { "response_modalities": ["AUDIO"] },
            "tools": [{ "google_search": {} }],
            "system_instruction": {
                "parts": [
                    { "text": persona_prompt(vars) },
                    { "text": format!("SENSOR_CONTEXT_JSON: {}", vars.to_json()) }
                ]
            }
        }
    })
}

pub fn media_frame(mime_type: &str, data: &str) -> Value {
    json!({
        "realtime_input": {
            "media_chunks": [{ "mime_type": mime_type, "data": data }]
        }
    })
}

/// Messages the browser sends over `/api/live`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Media { mime_type: String, data: String },
    Interrupt,
}

/// Events the bridge pushes to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    SetupComplete,
    SearchResults { results: Value },
    Text { text: String },
    #[serde(rename_all = "camelCase")]
    Audio { mime_type: &'static str, data: String },
    AudioLevel { level: f64 },
    Playing { playing: bool },
    Transcription { text: String },
    Chart { analysis: AnalysisResult },
    Error { message: String },
}

/// What one upstream frame carries, flattened.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ServerFrame {
    pub setup_complete: bool,
    pub grounding: Option<Value>,
    pub audio: Vec<String>,
    pub text: Vec<String>,
    pub turn_complete: bool,
}

impl ServerFrame {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        let mut frame = Self {
            setup_complete: value.get("setupComplete").is_some(),
            ..Self::default()
        };
        let Some(content) = value.get("serverContent") else {
            return Ok(frame);
        };

        frame.grounding = content.get("groundingMetadata").cloned();
        frame.turn_complete = content.get("turnComplete").and_then(Value::as_bool) == Some(true);

        let parts = content
            .pointer("/modelTurn/parts")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for part in parts {
            if let Some(inline) = part.get("inlineData") {
                if inline.get("mimeType").and_then(Value::as_str) == Some(PCM_MIME_TYPE) {
                    if let Some(data) = inline.get("data").and_then(Value::as_str) {
                        frame.audio.push(data.to_string());
                    }
                }
            }
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                frame.text.push(text.to_string());
            }
        }
        Ok(frame)
    }
}

/// 16-bit little-endian samples; a trailing odd byte is dropped.
pub fn pcm_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

pub fn audio_level(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|s| (*s as f64 / 32768.0).abs()).sum();
    (sum / samples.len() as f64 * 500.0).min(100.0)
}

/// One decoded chunk of model speech.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmChunk {
    pub data: String,
    pub bytes: Vec<u8>,
}

impl PcmChunk {
    pub fn decode(data: &str) -> Result<Self, base64::DecodeError> {
        Ok(Self {
            data: data.to_string(),
            bytes: BASE64.decode(data)?,
        })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64((self.bytes.len() / 2) as f64 / SAMPLE_RATE as f64)
    }
}

/// Everything gathered between two `turnComplete` frames.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TurnState {
    pub pcm: Vec<u8>,
    pub agent_text: String,
    pub search_results: Option<Value>,
}

impl TurnState {
    pub fn has_audio(&self) -> bool {
        !self.pcm.is_empty()
    }

    /// Hands the turn over and leaves an empty one behind.
    pub fn take(&mut self) -> TurnState {
        std::mem::take(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Start {
        sequence: u64,
        chunk: PcmChunk,
        level: f64,
        duration: Duration,
    },
    Playing(bool),
}

/// FIFO of speech chunks with at most one in flight.
///
/// Callers forward `Start` chunks to the client and call [`finish`] with the
/// chunk's sequence once its duration has elapsed. Finishes for a sequence
/// that is no longer current are ignored.
///
/// [`finish`]: PlaybackQueue::finish
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    queue: VecDeque<PcmChunk>,
    current: Option<u64>,
    next_sequence: u64,
}

impl PlaybackQueue {
    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn push(&mut self, chunk: PcmChunk) -> Vec<PlaybackEvent> {
        self.queue.push_back(chunk);
        if self.current.is_some() {
            return Vec::new();
        }
        let mut events = vec![PlaybackEvent::Playing(true)];
        events.extend(self.start_next());
        events
    }

    pub fn finish(&mut self, sequence: u64) -> Vec<PlaybackEvent> {
        if self.current != Some(sequence) {
            return Vec::new();
        }
        self.current = None;
        if self.queue.is_empty() {
            return vec![PlaybackEvent::Playing(false)];
        }
        self.start_next().into_iter().collect()
    }

    pub fn interrupt(&mut self) -> Vec<PlaybackEvent> {
        self.queue.clear();
        self.current = None;
        vec![PlaybackEvent::Playing(false)]
    }

    fn start_next(&mut self) -> Option<PlaybackEvent> {
        let chunk = self.queue.pop_front()?;
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.current = Some(sequence);

        let level = audio_level(&pcm_samples(&chunk.bytes));
        let duration = chunk.duration();
        Some(PlaybackEvent::Start {
            sequence,
            chunk,
            level,
            duration,
        })
    }
}
