// ThingSpeak repository implementation
use crate::application::error::GatewayError;
use crate::application::telemetry_repository::{Channel, FeedRepository};
use crate::domain::telemetry::Feed;
use crate::infrastructure::config::{ThingSpeakSettings, present};
use async_trait::async_trait;
use serde::Deserialize;

const SERVICE: &str = "ThingSpeak";

#[derive(Debug, Deserialize)]
struct ChannelFeeds {
    #[serde(default)]
    feeds: Vec<Feed>,
}

#[derive(Debug, Clone)]
pub struct ThingSpeakRepository {
    client: reqwest::Client,
    settings: ThingSpeakSettings,
}

impl ThingSpeakRepository {
    pub fn new(client: reqwest::Client, mut settings: ThingSpeakSettings) -> Self {
        settings.base_url = settings.base_url.trim_end_matches('/').to_string();
        Self { client, settings }
    }

    /// Channel id and read key for a logical channel.
    fn channel(&self, channel: Channel) -> Result<(&str, Option<&str>), GatewayError> {
        let sensors = || -> Result<&str, GatewayError> {
            let id = self.settings.channel_id.trim();
            if id.is_empty() {
                return Err(GatewayError::Config(
                    "ThingSpeak API configuration is missing. Set thingspeak.channel_id and thingspeak.read_api_key.".to_string(),
                ));
            }
            Ok(id)
        };
        let read_key = present(&self.settings.read_api_key);

        match channel {
            Channel::Sensors => Ok((sensors()?, read_key)),
            Channel::Pump => match present(&self.settings.pump_channel_id) {
                Some(id) => Ok((id, read_key)),
                None => Ok((sensors()?, read_key)),
            },
            Channel::VitalStats => {
                let id = present(&self.settings.vital_channel_id);
                let key = present(&self.settings.vital_read_api_key);
                match (id, key) {
                    (Some(id), Some(key)) => Ok((id, Some(key))),
                    _ => Err(GatewayError::Config(
                        "ThingSpeak configuration missing for Vital Stats. Set thingspeak.vital_channel_id and thingspeak.vital_read_api_key.".to_string(),
                    )),
                }
            }
        }
    }
}

/// Hides an API key before a URL is logged.
fn redacted(url: &str, key: Option<&str>) -> String {
    match key {
        Some(key) => url.replace(key, "***HIDDEN***"),
        None => url.to_string(),
    }
}

#[async_trait]
impl FeedRepository for ThingSpeakRepository {
    async fn feeds(&self, channel: Channel, results: u32) -> Result<Vec<Feed>, GatewayError> {
        let (channel_id, read_key) = self.channel(channel)?;
        let mut url = format!(
            "{}/channels/{}/feeds.json?results={}",
            self.settings.base_url, channel_id, results
        );
        if let Some(key) = read_key {
            url.push_str(&format!("&api_key={}", urlencoding::encode(key)));
        }
        tracing::debug!(url = %redacted(&url, read_key), ?channel, "Fetching ThingSpeak feeds");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(service = SERVICE, status = status.as_u16(), "Feed read failed");
            return Err(GatewayError::upstream(SERVICE, status.as_u16(), &body));
        }

        let data = response
            .json::<ChannelFeeds>()
            .await
            .map_err(|e| GatewayError::Decode(format!("Failed to parse ThingSpeak feeds: {}", e)))?;
        Ok(data.feeds)
    }

    async fn write_field(&self, field: u8, value: u8) -> Result<String, GatewayError> {
        let write_key = present(&self.settings.write_api_key).ok_or_else(|| {
            GatewayError::Config(
                "Missing ThingSpeak channel or write API key. Set thingspeak.channel_id and thingspeak.write_api_key.".to_string(),
            )
        })?;
        let url = format!(
            "{}/update.json?api_key={}&field{}={}",
            self.settings.base_url,
            urlencoding::encode(write_key),
            field,
            value
        );

        let response = self.client.post(&url).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(service = SERVICE, status = status.as_u16(), "Pump write failed");
            return Err(GatewayError::upstream(SERVICE, status.as_u16(), &body));
        }

        // ThingSpeak answers "0" when an update arrives inside its 15 s window.
        let entry_id = body.trim().trim_matches('"').to_string();
        if entry_id == "0" {
            tracing::warn!(field, value, "ThingSpeak refused the write (rate limited)");
            return Err(GatewayError::RateLimited { service: SERVICE });
        }
        Ok(entry_id)
    }
}
