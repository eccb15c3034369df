//! Notification dispatch: locale resolution, channel selection, rendering
//! and the ledger write for every attempt.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{NotificationError, NotificationResult};
use crate::models::{
    BatchOutcome, Channel, CreateNotificationLog, Locale, LocalizedText, NotificationLog,
    NotificationPreference, NotificationStatus, SendNotification,
};
use crate::providers::{ProviderRegistry, RenderedMessage};
use crate::repository::NotificationLogRepository;
use crate::templates::interpolate;

/// Concurrent provider calls per batch.
const MAX_IN_FLIGHT: usize = 10;

/// What the dispatcher needs to know about a recipient.
///
/// Implemented by the membership domain; keeps this crate free of any
/// dependency on profile storage.
#[derive(Debug, Clone)]
pub struct RecipientProfile {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// The member's own locale choice, if they made one.
    pub preferred_locale: Option<Locale>,
    pub preference: NotificationPreference,
}

/// Recipient lookup, implemented by the membership domain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn recipient_profile(
        &self,
        profile_id: Uuid,
    ) -> NotificationResult<Option<RecipientProfile>>;

    /// The church's default locale, used when a profile has none.
    async fn church_default_locale(&self, church_id: Uuid) -> NotificationResult<Locale>;
}

/// The sending interface trigger jobs and API handlers depend on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Dispatch one notification to one recipient. Provider failures are
    /// recorded on the ledger entry and do not surface as `Err`.
    async fn send_notification(
        &self,
        input: SendNotification,
    ) -> NotificationResult<NotificationLog>;

    /// Fan a batch out with bounded concurrency. Per-recipient errors are
    /// logged and counted, never raised.
    async fn send_batch(&self, inputs: Vec<SendNotification>) -> BatchOutcome;
}

/// Resolves each recipient's locale and channels, renders the message and
/// writes one ledger entry per (recipient, channel).
pub struct NotificationDispatcher {
    ledger: Arc<dyn NotificationLogRepository>,
    directory: Arc<dyn RecipientDirectory>,
    providers: Arc<ProviderRegistry>,
}

impl NotificationDispatcher {
    pub fn new(
        ledger: Arc<dyn NotificationLogRepository>,
        directory: Arc<dyn RecipientDirectory>,
        providers: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            ledger,
            directory,
            providers,
        }
    }

    /// The external channel a profile's preference resolves to, or None
    /// for a ledger-only dispatch.
    fn external_channel(&self, preference: NotificationPreference) -> Option<Channel> {
        match preference {
            NotificationPreference::Whatsapp => Some(Channel::Whatsapp),
            NotificationPreference::Sms => Some(Channel::Sms),
            NotificationPreference::Email => Some(Channel::Email),
            NotificationPreference::All => self.providers.richest_configured(),
            NotificationPreference::None => None,
        }
    }

    fn entry_for(
        input: &SendNotification,
        title: &LocalizedText,
        body: &LocalizedText,
        profile_id: Option<Uuid>,
        channel: Channel,
        status: NotificationStatus,
    ) -> CreateNotificationLog {
        CreateNotificationLog {
            profile_id,
            church_id: input.church_id,
            channel,
            notification_type: input.notification_type,
            title_en: title.en.clone(),
            title_ar: title.ar.clone(),
            body_en: body.en.clone(),
            body_ar: body.ar.clone(),
            reference_id: input.reference_id,
            reference_type: input.reference_type.clone(),
            status,
        }
    }

    /// Create the external-channel entry, call the provider, and record
    /// the outcome. Provider errors end up on the entry, not in `Err`.
    async fn dispatch_external(
        &self,
        input: &SendNotification,
        title: &LocalizedText,
        body: &LocalizedText,
        profile_id: Option<Uuid>,
        channel: Channel,
        to: &str,
        locale: Locale,
    ) -> NotificationResult<NotificationLog> {
        let provider = self
            .providers
            .configured(channel)
            .ok_or_else(|| {
                NotificationError::Config(format!("no provider configured for {}", channel))
            })?
            .clone();

        let entry = self
            .ledger
            .create(Self::entry_for(
                input,
                title,
                body,
                profile_id,
                channel,
                NotificationStatus::Queued,
            ))
            .await?;

        let rendered = RenderedMessage {
            title: title.get(locale).to_string(),
            body: body.get(locale).to_string(),
        };

        match provider.send(to, &rendered, locale).await {
            Ok(sent) => {
                self.ledger
                    .mark_outcome(entry.id, NotificationStatus::Sent, sent.external_id, None)
                    .await
            }
            Err(err) => {
                warn!(
                    notification_id = %entry.id,
                    channel = %channel,
                    provider = provider.name(),
                    error = %err,
                    "Provider send failed, recording on ledger entry"
                );
                self.ledger
                    .mark_outcome(entry.id, NotificationStatus::Failed, None, Some(err.to_string()))
                    .await
            }
        }
    }

    async fn send_to_profile(
        &self,
        profile_id: Uuid,
        input: SendNotification,
        title: LocalizedText,
        body: LocalizedText,
    ) -> NotificationResult<NotificationLog> {
        let profile = self
            .directory
            .recipient_profile(profile_id)
            .await?
            .ok_or_else(|| NotificationError::NotFound(format!("profile {}", profile_id)))?;

        let locale = match profile.preferred_locale {
            Some(locale) => locale,
            None => self.directory.church_default_locale(input.church_id).await?,
        };

        // Every profile recipient gets an in-app entry; there is nothing
        // to deliver, so it is born `sent`.
        let in_app = self
            .ledger
            .create(Self::entry_for(
                &input,
                &title,
                &body,
                Some(profile.id),
                Channel::InApp,
                NotificationStatus::Sent,
            ))
            .await?;

        let Some(channel) = self.external_channel(profile.preference) else {
            debug!(profile_id = %profile.id, "No external channel for recipient, in-app only");
            return Ok(in_app);
        };

        if self.providers.configured(channel).is_none() {
            warn!(
                profile_id = %profile.id,
                channel = %channel,
                "Preferred channel not configured, in-app only"
            );
            return Ok(in_app);
        }

        let address = match channel {
            Channel::Email => profile.email.clone(),
            _ => profile.phone.clone(),
        };
        let Some(to) = address else {
            warn!(
                profile_id = %profile.id,
                channel = %channel,
                "Recipient has no address for preferred channel, in-app only"
            );
            return Ok(in_app);
        };

        self.dispatch_external(&input, &title, &body, Some(profile.id), channel, &to, locale)
            .await?;

        // The in-app row is the primary entry for a profile recipient;
        // the external outcome, failed or not, lives on its own entry.
        Ok(in_app)
    }

    async fn send_to_visitor(
        &self,
        phone: String,
        input: SendNotification,
        title: LocalizedText,
        body: LocalizedText,
    ) -> NotificationResult<NotificationLog> {
        let locale = self.directory.church_default_locale(input.church_id).await?;

        // Visitors have no profile, so no in-app feed; the richest
        // configured phone-capable channel carries the message.
        let channel = [Channel::Whatsapp, Channel::Sms]
            .into_iter()
            .find(|channel| self.providers.configured(*channel).is_some())
            .ok_or_else(|| {
                NotificationError::Config("no phone-capable channel configured".to_string())
            })?;

        self.dispatch_external(&input, &title, &body, None, channel, &phone, locale)
            .await
    }
}

#[async_trait]
impl Notifier for NotificationDispatcher {
    #[instrument(skip(self, input), fields(notification_type = %input.notification_type))]
    async fn send_notification(
        &self,
        input: SendNotification,
    ) -> NotificationResult<NotificationLog> {
        // The ledger stores both locales; rendering happens once here.
        let title = LocalizedText::new(
            interpolate(&input.title.en, &input.data),
            interpolate(&input.title.ar, &input.data),
        );
        let body = LocalizedText::new(
            interpolate(&input.body.en, &input.data),
            interpolate(&input.body.ar, &input.data),
        );

        match (input.profile_id, input.visitor_phone.clone()) {
            (Some(profile_id), None) => self.send_to_profile(profile_id, input, title, body).await,
            (None, Some(phone)) => self.send_to_visitor(phone, input, title, body).await,
            _ => Err(NotificationError::Validation(
                "exactly one of profile_id and visitor_phone must be set".to_string(),
            )),
        }
    }

    async fn send_batch(&self, inputs: Vec<SendNotification>) -> BatchOutcome {
        let total = inputs.len();

        let results: Vec<NotificationResult<NotificationLog>> = stream::iter(inputs)
            .map(|input| self.send_notification(input))
            .buffer_unordered(MAX_IN_FLIGHT)
            .collect()
            .await;

        let mut sent = 0;
        for result in results {
            match result {
                Ok(log) if log.status != NotificationStatus::Failed => sent += 1,
                Ok(log) => {
                    debug!(notification_id = %log.id, "Dispatch recorded as failed");
                }
                Err(err) => {
                    warn!(error = %err, "Dispatch failed for one recipient");
                }
            }
        }

        BatchOutcome { sent, total }
    }
}
