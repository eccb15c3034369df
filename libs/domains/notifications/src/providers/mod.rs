//! External channel provider implementations.
//!
//! This module contains the `ChannelProvider` trait and implementations
//! for WhatsApp (Meta Cloud API), SMS gateways and SMTP email.

mod email;
mod sms;
mod whatsapp;

pub use email::{SmtpConfig, SmtpProvider};
pub use sms::{SmsConfig, SmsProvider};
pub use whatsapp::{WhatsAppConfig, WhatsAppProvider};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::NotificationResult;
use crate::models::{Channel, Locale};

/// A message rendered for a single recipient, ready for sending.
#[derive(Debug, Clone)]
pub struct RenderedMessage {
    pub title: String,
    pub body: String,
}

/// The result of handing a message to a provider.
#[derive(Debug, Clone)]
pub struct SentMessage {
    /// Provider-assigned id, used to reconcile delivery callbacks.
    /// None for channels without callbacks (SMTP).
    pub external_id: Option<String>,
}

/// Trait for external channel providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelProvider: Send + Sync {
    /// The channel this provider serves.
    fn channel(&self) -> Channel;

    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Whether the provider has the credentials it needs to send.
    fn is_configured(&self) -> bool;

    /// Send a rendered message to a phone number or email address.
    async fn send(
        &self,
        to: &str,
        message: &RenderedMessage,
        locale: Locale,
    ) -> NotificationResult<SentMessage>;
}

/// The set of configured external providers, keyed by channel.
///
/// Not every deployment configures every channel; the dispatcher asks
/// the registry what is available and falls back accordingly.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<Channel, Arc<dyn ChannelProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn ChannelProvider>) {
        self.providers.insert(provider.channel(), provider);
    }

    pub fn get(&self, channel: Channel) -> Option<&Arc<dyn ChannelProvider>> {
        self.providers.get(&channel)
    }

    /// A provider that is registered and has its credentials.
    pub fn configured(&self, channel: Channel) -> Option<&Arc<dyn ChannelProvider>> {
        self.providers
            .get(&channel)
            .filter(|provider| provider.is_configured())
    }

    /// The richest configured external channel, if any.
    pub fn richest_configured(&self) -> Option<Channel> {
        Channel::EXTERNAL_PRECEDENCE
            .into_iter()
            .find(|channel| self.configured(*channel).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_richest_configured_prefers_whatsapp() {
        let mut registry = ProviderRegistry::new();
        assert_eq!(registry.richest_configured(), None);

        let mut email = MockChannelProvider::new();
        email.expect_channel().return_const(Channel::Email);
        email.expect_is_configured().return_const(true);
        registry.register(Arc::new(email));
        assert_eq!(registry.richest_configured(), Some(Channel::Email));

        let mut whatsapp = MockChannelProvider::new();
        whatsapp.expect_channel().return_const(Channel::Whatsapp);
        whatsapp.expect_is_configured().return_const(true);
        registry.register(Arc::new(whatsapp));
        assert_eq!(registry.richest_configured(), Some(Channel::Whatsapp));

        let mut sms = MockChannelProvider::new();
        sms.expect_channel().return_const(Channel::Sms);
        sms.expect_is_configured().return_const(false);
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(sms));
        // Registered but unconfigured providers are never selected.
        assert_eq!(registry.richest_configured(), None);
    }
}
