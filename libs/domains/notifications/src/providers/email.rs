//! SMTP email provider implementation using lettre.
//!
//! Works against a production relay with TLS and credentials, or against
//! MailHog/Mailpit for local development.

use super::{ChannelProvider, RenderedMessage, SentMessage};
use crate::error::{NotificationError, NotificationResult};
use crate::models::{Channel, Locale};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, error, info};

/// SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server host.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Sender email address.
    pub from_email: String,
    /// Sender name.
    pub from_name: String,
    /// Credentials (optional for dev servers like Mailpit).
    pub username: Option<String>,
    pub password: Option<String>,
    /// Whether to use TLS (false for local dev servers).
    pub use_tls: bool,
}

impl SmtpConfig {
    pub fn new(host: String, port: u16, from_email: String, from_name: String) -> Self {
        Self {
            host,
            port,
            from_email,
            from_name,
            username: None,
            password: None,
            use_tls: false,
        }
    }

    /// Create configuration from environment variables. Defaults suit a
    /// local Mailpit instance.
    pub fn from_env() -> Result<Self, NotificationError> {
        Ok(Self {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1025),
            from_email: std::env::var("SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@localhost".to_string()),
            from_name: std::env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Kanisa".to_string()),
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            use_tls: std::env::var("SMTP_USE_TLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }
}

/// SMTP email provider.
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: SmtpConfig,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> NotificationResult<Self> {
        let transport = Self::build_transport(&config)?;
        Ok(Self { transport, config })
    }

    pub fn from_env() -> NotificationResult<Self> {
        Self::new(SmtpConfig::from_env()?)
    }

    fn build_transport(
        config: &SmtpConfig,
    ) -> NotificationResult<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| {
                    NotificationError::Config(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(config.port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host).port(config.port)
        };

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }

    fn build_message(&self, to: &str, message: &RenderedMessage) -> NotificationResult<Message> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| NotificationError::Config(format!("Invalid from address: {}", e)))?;

        let to: Mailbox = to
            .parse()
            .map_err(|e| NotificationError::Validation(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&message.title)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(Into::into)
    }
}

#[async_trait]
impl ChannelProvider for SmtpProvider {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn name(&self) -> &'static str {
        "SMTP"
    }

    fn is_configured(&self) -> bool {
        !self.config.host.is_empty() && !self.config.from_email.is_empty()
    }

    async fn send(
        &self,
        to: &str,
        message: &RenderedMessage,
        _locale: Locale,
    ) -> NotificationResult<SentMessage> {
        debug!(
            to = %to,
            subject = %message.title,
            host = %self.config.host,
            "Sending email via SMTP"
        );

        let email = self.build_message(to, message)?;

        self.transport.send(email).await.map_err(|e| {
            error!(to = %to, error = %e, "Failed to send email via SMTP");
            NotificationError::Provider(format!("SMTP send failed: {}", e))
        })?;

        info!(to = %to, "Email sent via SMTP");

        // SMTP has no delivery callbacks; the entry stays at `sent`.
        Ok(SentMessage { external_id: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_config_new() {
        let config = SmtpConfig::new(
            "mail.example.com".to_string(),
            587,
            "test@example.com".to_string(),
            "Test".to_string(),
        );
        assert_eq!(config.host, "mail.example.com");
        assert!(!config.use_tls);
    }

    #[test]
    fn test_smtp_config_builders() {
        let config = SmtpConfig::new(
            "smtp.example.com".to_string(),
            587,
            "test@example.com".to_string(),
            "Test".to_string(),
        )
        .with_tls(true)
        .with_credentials("user".to_string(), "pass".to_string());

        assert!(config.use_tls);
        assert_eq!(config.username, Some("user".to_string()));
    }
}
