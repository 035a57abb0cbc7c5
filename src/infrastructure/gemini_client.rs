// Gemini REST client: content generation and key diagnostics
use crate::application::error::GatewayError;
use crate::application::gateways::{
    ContentPart, GenerationRequest, GenerativeModel, ModelDiagnostics, ProbeOutcome,
};
use crate::infrastructure::config::{GeminiSettings, present};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::BTreeMap;

const SERVICE: &str = "Gemini";
const RATE_LIMIT_HEADERS: [&str; 3] = ["x-ratelimit-limit", "x-ratelimit-remaining", "x-ratelimit-reset"];

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, mut settings: GeminiSettings) -> Self {
        settings.base_url = settings.base_url.trim_end_matches('/').to_string();
        Self { client, settings }
    }

    fn key(&self) -> Result<&str, GatewayError> {
        present(&self.settings.api_key)
            .ok_or_else(|| GatewayError::Config("Missing API key for Balaram AI (Gemini).".to_string()))
    }

    fn generate_url(&self, model: &str, key: &str) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.settings.base_url,
            model,
            urlencoding::encode(key)
        )
    }

    async fn probe(&self, request: reqwest::RequestBuilder) -> ProbeOutcome {
        let request = match present(&self.settings.project_id) {
            Some(project) => request.header("x-goog-user-project", project),
            None => request,
        };
        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let rate_limit = RATE_LIMIT_HEADERS
                    .iter()
                    .filter_map(|name| {
                        let value = response.headers().get(*name)?.to_str().ok()?;
                        Some((name.to_string(), value.to_string()))
                    })
                    .collect::<BTreeMap<_, _>>();
                let body = response.text().await.unwrap_or_default();
                ProbeOutcome {
                    status: Some(status),
                    body,
                    rate_limit,
                    transport_error: None,
                }
            }
            Err(e) => ProbeOutcome {
                transport_error: Some(e.to_string()),
                ..ProbeOutcome::default()
            },
        }
    }
}

fn request_body(request: &GenerationRequest) -> Value {
    let parts: Vec<Value> = request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => json!({ "text": text }),
            ContentPart::InlineData { mime_type, data } => {
                json!({ "inlineData": { "mimeType": mime_type, "data": data } })
            }
        })
        .collect();
    let mut body = json!({ "contents": [{ "role": "user", "parts": parts }] });
    if let Some(config) = &request.config {
        body["generationConfig"] = json!(config);
    }
    body
}

/// Text of the first candidate, parts concatenated.
fn candidate_text(response: &Value) -> Option<String> {
    let parts = response.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    Some(text)
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GatewayError> {
        let key = self.key()?;
        let response = self
            .client
            .post(self.generate_url(&request.model, key))
            .json(&request_body(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(service = SERVICE, status = status.as_u16(), model = %request.model, "Generation failed");
            return Err(GatewayError::upstream(SERVICE, status.as_u16(), &body));
        }

        let data = response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Decode(format!("Failed to parse Gemini response: {}", e)))?;
        candidate_text(&data)
            .ok_or_else(|| GatewayError::Decode("Gemini response carried no candidate text".to_string()))
    }
}

#[async_trait]
impl ModelDiagnostics for GeminiClient {
    fn api_key(&self) -> Option<&str> {
        present(&self.settings.api_key)
    }

    fn project_id(&self) -> Option<&str> {
        present(&self.settings.project_id)
    }

    fn target_model(&self) -> &str {
        &self.settings.diagnostics_model
    }

    async fn list_models(&self) -> ProbeOutcome {
        let key = self.api_key().unwrap_or_default();
        let url = format!("{}/models?key={}", self.settings.base_url, urlencoding::encode(key));
        self.probe(self.client.get(url)).await
    }

    async fn ping(&self, model: &str) -> ProbeOutcome {
        let key = self.api_key().unwrap_or_default();
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": "ping" }] }],
            "generationConfig": { "maxOutputTokens": 4 }
        });
        self.probe(self.client.post(self.generate_url(model, key)).json(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::gateways::GenerationConfig;

    #[test]
    fn test_request_body_shape() {
        let body = request_body(&GenerationRequest {
            model: "models/x".into(),
            parts: vec![
                ContentPart::InlineData {
                    mime_type: "audio/wav".into(),
                    data: "UklG".into(),
                },
                ContentPart::Text("transcribe".into()),
            ],
            config: Some(GenerationConfig {
                temperature: Some(1.0),
                top_p: None,
                top_k: Some(40),
                max_output_tokens: 8192,
            }),
        });
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["mimeType"], "audio/wav");
        assert_eq!(body["contents"][0]["parts"][1]["text"], "transcribe");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert!(body["generationConfig"].get("topP").is_none());
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let response = json!({"candidates": [{"content": {"parts": [{"text": "Water "}, {"text": "tonight"}]}}]});
        assert_eq!(candidate_text(&response).as_deref(), Some("Water tonight"));
        assert_eq!(candidate_text(&json!({"candidates": []})), None);
    }

    #[tokio::test]
    async fn test_generate_without_key_is_config_error() {
        let client = GeminiClient::new(reqwest::Client::new(), GeminiSettings::default());
        let result = client
            .generate(GenerationRequest {
                model: "models/x".into(),
                parts: vec![ContentPart::Text("hi".into())],
                config: None,
            })
            .await;
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }
}
