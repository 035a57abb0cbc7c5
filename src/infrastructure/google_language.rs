// Google translate and text-to-speech client
use crate::application::error::GatewayError;
use crate::application::gateways::TranslationGateway;
use crate::infrastructure::config::GoogleSettings;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct GoogleLanguageClient {
    client: reqwest::Client,
    settings: GoogleSettings,
}

impl GoogleLanguageClient {
    pub fn new(client: reqwest::Client, settings: GoogleSettings) -> Self {
        Self { client, settings }
    }
}

/// Joins the translated segments of a `translate_a/single` answer, which
/// looks like `[[["Hola", "Hello", ...], ...], ...]`.
fn translated_text(data: &Value) -> Option<String> {
    let segments = data.get(0)?.as_array()?;
    Some(
        segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect(),
    )
}

#[async_trait]
impl TranslationGateway for GoogleLanguageClient {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, GatewayError> {
        let url = format!(
            "{}?client=gtx&sl=auto&tl={}&dt=t&q={}",
            self.settings.translate_url,
            urlencoding::encode(target_lang),
            urlencoding::encode(text)
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::upstream("Google Translate", status.as_u16(), &body));
        }

        let data = response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Decode(format!("Failed to parse translation: {}", e)))?;
        translated_text(&data)
            .ok_or_else(|| GatewayError::Decode("Unexpected translation response shape".to_string()))
    }

    async fn speech_chunk(
        &self,
        text: &str,
        lang: &str,
        index: usize,
        total: usize,
    ) -> Result<Bytes, GatewayError> {
        let url = format!(
            "{}?ie=UTF-8&q={}&tl={}&total={}&idx={}&textlen={}&client=tw-ob&prev=input&ttsspeed=1",
            self.settings.tts_url,
            urlencoding::encode(text),
            urlencoding::encode(lang),
            total,
            index,
            text.chars().count()
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::upstream("Google TTS", status.as_u16(), &body));
        }
        Ok(response.bytes().await?)
    }
}
