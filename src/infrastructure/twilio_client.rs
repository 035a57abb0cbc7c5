// Twilio SMS client
use crate::application::error::GatewayError;
use crate::application::gateways::SmsSender;
use crate::infrastructure::config::{TwilioSettings, present};
use async_trait::async_trait;

const SERVICE: &str = "Twilio";

#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: reqwest::Client,
    settings: TwilioSettings,
}

impl TwilioClient {
    pub fn new(client: reqwest::Client, settings: TwilioSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl SmsSender for TwilioClient {
    async fn send(&self, body: &str) -> Result<(), GatewayError> {
        let s = &self.settings;
        let (Some(sid), Some(token), Some(from), Some(to)) = (
            present(&s.account_sid),
            present(&s.auth_token),
            present(&s.from_number),
            present(&s.to_number),
        ) else {
            return Err(GatewayError::Config(
                "Twilio is not configured. Set twilio.account_sid, auth_token, from_number and to_number.".to_string(),
            ));
        };

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            s.base_url.trim_end_matches('/'),
            sid
        );
        let response = self
            .client
            .post(&url)
            .basic_auth(sid, Some(token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(service = SERVICE, status = status.as_u16(), "SMS delivery failed");
            return Err(GatewayError::upstream(SERVICE, status.as_u16(), &text));
        }
        Ok(())
    }
}
