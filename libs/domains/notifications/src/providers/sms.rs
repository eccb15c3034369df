//! SMS provider implementation for a generic HTTP gateway.
//!
//! Most regional SMS gateways expose the same shape: a JSON POST with a
//! bearer key, returning a message id. The endpoint and sender id are
//! configuration so the same provider works against any of them.

use super::{ChannelProvider, RenderedMessage, SentMessage};
use crate::error::{NotificationError, NotificationResult};
use crate::models::{Channel, Locale};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// SMS gateway configuration.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Gateway send endpoint.
    pub gateway_url: String,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Registered sender id shown to recipients.
    pub sender_id: String,
}

impl SmsConfig {
    pub fn new(gateway_url: String, api_key: String, sender_id: String) -> Self {
        Self {
            gateway_url,
            api_key,
            sender_id,
        }
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, NotificationError> {
        let gateway_url = std::env::var("SMS_GATEWAY_URL")
            .map_err(|_| NotificationError::Config("SMS_GATEWAY_URL not set".to_string()))?;
        let api_key = std::env::var("SMS_API_KEY")
            .map_err(|_| NotificationError::Config("SMS_API_KEY not set".to_string()))?;
        let sender_id = std::env::var("SMS_SENDER_ID").unwrap_or_else(|_| "Kanisa".to_string());

        Ok(Self::new(gateway_url, api_key, sender_id))
    }
}

/// SMS provider over a generic HTTP gateway.
pub struct SmsProvider {
    config: SmsConfig,
    client: Client,
}

impl SmsProvider {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, NotificationError> {
        let config = SmsConfig::from_env()?;
        Ok(Self::new(config))
    }
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    to: &'a str,
    from: &'a str,
    text: String,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    message_id: Option<String>,
}

#[async_trait]
impl ChannelProvider for SmsProvider {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn name(&self) -> &'static str {
        "SMS gateway"
    }

    fn is_configured(&self) -> bool {
        !self.config.gateway_url.is_empty() && !self.config.api_key.is_empty()
    }

    async fn send(
        &self,
        to: &str,
        message: &RenderedMessage,
        _locale: Locale,
    ) -> NotificationResult<SentMessage> {
        // SMS has no subject line; the title leads the single text blob.
        let text = if message.title.is_empty() {
            message.body.clone()
        } else {
            format!("{}\n{}", message.title, message.body)
        };

        let request = GatewayRequest {
            to,
            from: &self.config.sender_id,
            text,
        };

        debug!(to = %to, "Sending SMS");

        let response = self
            .client
            .post(&self.config.gateway_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let parsed: GatewayResponse = response.json().await?;

            info!(to = %to, message_id = ?parsed.message_id, "SMS accepted by gateway");
            Ok(SentMessage {
                external_id: parsed.message_id,
            })
        } else {
            let error_body = response.text().await.unwrap_or_default();
            error!(to = %to, status = %status, error = %error_body, "SMS send failed");

            Err(NotificationError::Provider(format!(
                "SMS gateway error ({}): {}",
                status, error_body
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sms_config_new() {
        let config = SmsConfig::new(
            "https://gateway.example.com/send".to_string(),
            "key".to_string(),
            "Kanisa".to_string(),
        );
        assert_eq!(config.sender_id, "Kanisa");
    }
}
