// Client for the crop recommendation and hyperspectral ML services
use crate::application::error::GatewayError;
use crate::application::gateways::{HsiUpload, MlGateway};
use crate::domain::recommendation::{AgricultureDataset, RecommendationRequest};
use crate::infrastructure::config::MlSettings;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

const SERVICE: &str = "ML service";

#[derive(Debug, Clone)]
pub struct MlClient {
    client: reqwest::Client,
    recommendation_url: String,
    hsi_url: String,
}

impl MlClient {
    pub fn new(client: reqwest::Client, settings: &MlSettings) -> Self {
        Self {
            client,
            recommendation_url: settings.recommendation_url.trim_end_matches('/').to_string(),
            hsi_url: settings.hsi_url.trim_end_matches('/').to_string(),
        }
    }

    /// Recommendation endpoints hand their failure status back to the caller.
    async fn recommendation_body(response: reqwest::Response) -> Result<Value, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(service = SERVICE, status = status.as_u16(), "Recommendation request failed");
            return Err(GatewayError::passthrough(
                status.as_u16(),
                format!("ML service error: {}", text),
            ));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Decode(format!("Failed to parse ML service response: {}", e)))
    }

    /// Hyperspectral endpoints map failures to 502 and wrap non-JSON bodies.
    async fn hsi_body(response: reqwest::Response) -> Result<Value, GatewayError> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(service = SERVICE, status = status.as_u16(), "HSI request failed");
            return Err(GatewayError::upstream(SERVICE, status.as_u16(), &text));
        }
        Ok(parse_or_raw(&text))
    }
}

fn parse_or_raw(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

#[async_trait]
impl MlGateway for MlClient {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(format!("{}/agriculture/recommendation", self.recommendation_url))
            .json(request)
            .send()
            .await?;
        Self::recommendation_body(response).await
    }

    async fn dataset(&self, dataset: AgricultureDataset) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(format!("{}{}", self.recommendation_url, dataset.path()))
            .header("Accept", "application/json")
            .send()
            .await?;
        Self::recommendation_body(response).await
    }

    async fn lstm_map(&self, body: Value) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(format!("{}/hsi/lstm-map", self.hsi_url))
            .json(&body)
            .send()
            .await?;
        Self::hsi_body(response).await
    }

    async fn upload_map(&self, upload: HsiUpload) -> Result<Value, GatewayError> {
        let bytes = upload.data.len();
        let mut part = Part::bytes(upload.data.to_vec()).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| GatewayError::BadRequest(format!("Invalid file content type: {}", e)))?;
        }

        let mut form = Form::new().text("model", upload.model).part("file", part);
        for (key, value) in upload.options {
            form = form.text(key, value);
        }
        tracing::debug!(bytes, "Forwarding hyperspectral cube");

        let response = self
            .client
            .post(format!("{}/hsi/upload-map", self.hsi_url))
            .multipart(form)
            .send()
            .await?;
        Self::hsi_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_json_body_is_wrapped() {
        assert_eq!(parse_or_raw("<html>ok</html>"), json!({"raw": "<html>ok</html>"}));
        assert_eq!(parse_or_raw(r#"{"map": [1, 2]}"#), json!({"map": [1, 2]}));
    }

    #[test]
    fn test_urls_are_normalised() {
        let client = MlClient::new(
            reqwest::Client::new(),
            &MlSettings {
                recommendation_url: "http://ml:8000/".into(),
                hsi_url: "http://hsi:8001".into(),
                timeout_secs: 5,
                ..MlSettings::default()
            },
        );
        assert_eq!(client.recommendation_url, "http://ml:8000");
        assert_eq!(client.hsi_url, "http://hsi:8001");
    }
}
