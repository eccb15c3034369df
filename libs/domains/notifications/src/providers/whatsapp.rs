//! WhatsApp provider implementation using the Meta Cloud API.

use super::{ChannelProvider, RenderedMessage, SentMessage};
use crate::error::{NotificationError, NotificationResult};
use crate::models::{Channel, Locale};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Meta Cloud API configuration.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Permanent access token for the WhatsApp Business account.
    pub access_token: String,
    /// Phone number id messages are sent from.
    pub phone_number_id: String,
    /// Graph API base URL (defaults to production).
    pub api_url: String,
}

impl WhatsAppConfig {
    /// Create a new WhatsApp configuration.
    pub fn new(access_token: String, phone_number_id: String) -> Self {
        Self {
            access_token,
            phone_number_id,
            api_url: "https://graph.facebook.com/v19.0".to_string(),
        }
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, NotificationError> {
        let access_token = std::env::var("WHATSAPP_ACCESS_TOKEN").map_err(|_| {
            NotificationError::Config("WHATSAPP_ACCESS_TOKEN not set".to_string())
        })?;
        let phone_number_id = std::env::var("WHATSAPP_PHONE_NUMBER_ID").map_err(|_| {
            NotificationError::Config("WHATSAPP_PHONE_NUMBER_ID not set".to_string())
        })?;

        let mut config = Self::new(access_token, phone_number_id);
        if let Ok(api_url) = std::env::var("WHATSAPP_API_URL") {
            config.api_url = api_url;
        }
        Ok(config)
    }
}

/// WhatsApp provider over the Meta Cloud API.
pub struct WhatsAppProvider {
    config: WhatsAppConfig,
    client: Client,
}

impl WhatsAppProvider {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, NotificationError> {
        let config = WhatsAppConfig::from_env()?;
        Ok(Self::new(config))
    }
}

// Meta Cloud API request/response structures

#[derive(Debug, Serialize)]
struct CloudApiRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: TextBody,
}

#[derive(Debug, Serialize)]
struct TextBody {
    body: String,
}

#[derive(Debug, Deserialize)]
struct CloudApiResponse {
    messages: Vec<CloudApiMessage>,
}

#[derive(Debug, Deserialize)]
struct CloudApiMessage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CloudApiError {
    error: CloudApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct CloudApiErrorDetail {
    message: String,
}

#[async_trait]
impl ChannelProvider for WhatsAppProvider {
    fn channel(&self) -> Channel {
        Channel::Whatsapp
    }

    fn name(&self) -> &'static str {
        "WhatsApp Cloud API"
    }

    fn is_configured(&self) -> bool {
        !self.config.access_token.is_empty() && !self.config.phone_number_id.is_empty()
    }

    async fn send(
        &self,
        to: &str,
        message: &RenderedMessage,
        _locale: Locale,
    ) -> NotificationResult<SentMessage> {
        // WhatsApp text messages have no separate subject line.
        let body = if message.title.is_empty() {
            message.body.clone()
        } else {
            format!("*{}*\n{}", message.title, message.body)
        };

        let request = CloudApiRequest {
            messaging_product: "whatsapp",
            to,
            message_type: "text",
            text: TextBody { body },
        };

        debug!(to = %to, "Sending WhatsApp message");

        let response = self
            .client
            .post(format!(
                "{}/{}/messages",
                self.config.api_url, self.config.phone_number_id
            ))
            .bearer_auth(&self.config.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let parsed: CloudApiResponse = response.json().await?;
            let external_id = parsed.messages.into_iter().next().map(|m| m.id);

            info!(to = %to, message_id = ?external_id, "WhatsApp message accepted");
            Ok(SentMessage { external_id })
        } else {
            let error_body = response.text().await.unwrap_or_default();
            error!(to = %to, status = %status, error = %error_body, "WhatsApp send failed");

            let error_message =
                if let Ok(api_error) = serde_json::from_str::<CloudApiError>(&error_body) {
                    api_error.error.message
                } else {
                    error_body
                };

            Err(NotificationError::Provider(format!(
                "WhatsApp Cloud API error ({}): {}",
                status, error_message
            )))
        }
    }
}
