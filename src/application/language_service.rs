// Language service - Translation, speech synthesis and language detection
use crate::application::error::GatewayError;
use crate::application::gateways::TranslationGateway;
use crate::domain::language::{LanguagePrompt, PROMPTS, detect_language};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::Arc;

/// Longest text the speech endpoint accepts in one request.
pub const MAX_SPEECH_CHUNK: usize = 200;

#[derive(Clone)]
pub struct LanguageService {
    gateway: Arc<dyn TranslationGateway>,
}

impl LanguageService {
    pub fn new(gateway: Arc<dyn TranslationGateway>) -> Self {
        Self { gateway }
    }

    pub async fn translate(&self, text: &str, target_lang: &str) -> Result<String, GatewayError> {
        self.gateway.translate(text, target_lang).await
    }

    /// MP3 speech for `text` as a `data:` URL.
    pub async fn speak(&self, text: &str, lang: &str) -> Result<String, GatewayError> {
        let chunks = split_for_speech(text, MAX_SPEECH_CHUNK);
        let mut audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let bytes = self
                .gateway
                .speech_chunk(chunk, lang, index, chunks.len())
                .await?;
            audio.extend_from_slice(&bytes);
        }
        tracing::debug!(chunks = chunks.len(), bytes = audio.len(), "Speech synthesized");
        Ok(format!("data:audio/mpeg;base64,{}", BASE64.encode(audio)))
    }

    pub fn detect(&self, transcript: &str) -> Option<&'static str> {
        detect_language(transcript)
    }

    pub fn prompts(&self) -> &'static [LanguagePrompt] {
        &PROMPTS
    }
}

/// Splits on whitespace into chunks of at most `max` characters. Words longer
/// than `max` are cut.
pub fn split_for_speech(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.push(word.drain(..max).collect());
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() { word.len() } else { word.len() + 1 };
        if current_len + needed > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
