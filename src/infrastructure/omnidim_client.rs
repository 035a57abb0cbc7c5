// Omnidim voice-agent call dispatch client
use crate::application::error::GatewayError;
use crate::application::gateways::CallDispatcher;
use crate::infrastructure::config::{OmnidimSettings, present};
use async_trait::async_trait;
use serde_json::{Value, json};

const SERVICE: &str = "Omnidim";

#[derive(Debug, Clone)]
pub struct OmnidimClient {
    client: reqwest::Client,
    settings: OmnidimSettings,
}

impl OmnidimClient {
    pub fn new(client: reqwest::Client, settings: OmnidimSettings) -> Self {
        Self { client, settings }
    }
}

/// Dispatch body. Numeric agent ids are sent as numbers.
fn dispatch_body(agent_id: &str, to: &str, from_number_id: Option<&str>, call_context: Option<Value>) -> Value {
    let agent_id = agent_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(agent_id));
    let mut body = json!({
        "agent_id": agent_id,
        "to_number": to,
        "call_context": call_context.unwrap_or_else(|| json!({"source": "dashboard", "intent": "test_call"})),
    });
    if let Some(from) = from_number_id {
        body["from_number_id"] = Value::from(from);
    }
    body
}

#[async_trait]
impl CallDispatcher for OmnidimClient {
    fn is_configured(&self) -> bool {
        present(&self.settings.api_key).is_some() && present(&self.settings.agent_id).is_some()
    }

    async fn dispatch(&self, to: &str, call_context: Option<Value>) -> Result<Value, GatewayError> {
        let (Some(api_key), Some(agent_id)) =
            (present(&self.settings.api_key), present(&self.settings.agent_id))
        else {
            return Err(GatewayError::Config("Missing Omnidim API configuration".to_string()));
        };

        let url = format!(
            "{}/api/v1/calls/dispatch",
            self.settings.base_url.trim_end_matches('/')
        );
        let body = dispatch_body(agent_id, to, present(&self.settings.from_number_id), call_context);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(service = SERVICE, status = status.as_u16(), "Call dispatch failed");
            return Err(GatewayError::upstream(SERVICE, status.as_u16(), &text));
        }
        tracing::info!("Voice-agent call dispatched");
        Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_agent_id_is_a_number() {
        let body = dispatch_body("42", "+91999", None, None);
        assert_eq!(body["agent_id"], 42);
        assert_eq!(body["call_context"]["intent"], "test_call");
        assert!(body.get("from_number_id").is_none());

        let body = dispatch_body("agent-x", "+91999", Some("7"), Some(json!({"crop": "rice"})));
        assert_eq!(body["agent_id"], "agent-x");
        assert_eq!(body["from_number_id"], "7");
        assert_eq!(body["call_context"]["crop"], "rice");
    }

    #[test]
    fn test_configuration_requires_key_and_agent() {
        let client = OmnidimClient::new(
            reqwest::Client::new(),
            OmnidimSettings {
                api_key: Some("k".into()),
                ..OmnidimSettings::default()
            },
        );
        assert!(!client.is_configured());
    }
}
