//! Data models for the notifications domain.

use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};
use uuid::Uuid;

/// Delivery channel for a notification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_channel")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    /// Ledger-only: "delivery" is the recipient reading the feed.
    #[sea_orm(string_value = "in_app")]
    InApp,
    #[sea_orm(string_value = "whatsapp")]
    Whatsapp,
    #[sea_orm(string_value = "sms")]
    Sms,
    #[sea_orm(string_value = "email")]
    Email,
}

impl Channel {
    /// External channels in descending richness, used when a recipient
    /// asked for `all` channels.
    pub const EXTERNAL_PRECEDENCE: [Channel; 3] = [Channel::Whatsapp, Channel::Sms, Channel::Email];
}

/// Domain event tag a notification concerns.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_type")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    #[sea_orm(string_value = "event_reminder")]
    EventReminder,
    #[sea_orm(string_value = "gathering_reminder")]
    GatheringReminder,
    #[sea_orm(string_value = "visitor_sla_escalation")]
    VisitorSlaEscalation,
    #[sea_orm(string_value = "at_risk_member")]
    AtRiskMember,
    #[sea_orm(string_value = "general")]
    General,
}

/// Delivery lifecycle of a ledger entry.
///
/// `queued → sent → delivered → read`, or `failed` (terminal).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationStatus {
    #[sea_orm(string_value = "queued")]
    Queued,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "read")]
    Read,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl NotificationStatus {
    /// Parse a provider callback status. Providers report a subset of
    /// the lifecycle; anything else is ignored by the ingestor.
    pub fn from_provider(raw: &str) -> Option<Self> {
        match raw {
            "sent" => Some(NotificationStatus::Sent),
            "delivered" => Some(NotificationStatus::Delivered),
            "read" => Some(NotificationStatus::Read),
            "failed" => Some(NotificationStatus::Failed),
            _ => None,
        }
    }
}

/// A member's channel preference on their profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationPreference {
    #[default]
    Whatsapp,
    Sms,
    Email,
    /// In-app plus the richest configured external channel.
    All,
    /// In-app ledger write only, no external call.
    None,
}

/// Supported rendering locales. Arabic is the final fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Locale {
    #[default]
    Ar,
    En,
}

impl Locale {
    /// Parse a BCP-47-ish tag leniently (`"ar"`, `"ar-EG"`, `"en-US"`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.get(..2)?.to_ascii_lowercase().as_str() {
            "ar" => Some(Locale::Ar),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

/// A title or body carried in both supported locales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalizedText {
    pub en: String,
    pub ar: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
        }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Ar => &self.ar,
        }
    }
}

/// One ledger row per (recipient, occasion). Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLog {
    pub id: Uuid,
    /// None for non-profile recipients (visitors contacted by phone).
    pub profile_id: Option<Uuid>,
    pub church_id: Uuid,
    pub channel: Channel,
    pub notification_type: NotificationType,
    pub title_en: String,
    pub title_ar: String,
    pub body_en: String,
    pub body_ar: String,
    /// The domain object this notification concerns (event id, ...).
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    /// Provider-assigned message id, used to reconcile webhook callbacks.
    pub external_message_id: Option<String>,
    pub status: NotificationStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Input for creating a ledger entry.
#[derive(Debug, Clone)]
pub struct CreateNotificationLog {
    pub profile_id: Option<Uuid>,
    pub church_id: Uuid,
    pub channel: Channel,
    pub notification_type: NotificationType,
    pub title_en: String,
    pub title_ar: String,
    pub body_en: String,
    pub body_ar: String,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub status: NotificationStatus,
}

/// One logical notification to one recipient, as handed to the dispatcher.
#[derive(Debug, Clone)]
pub struct SendNotification {
    /// Profile recipient; exactly one of this and `visitor_phone` is set.
    pub profile_id: Option<Uuid>,
    /// Phone-only recipient (a visitor not yet converted to a profile).
    pub visitor_phone: Option<String>,
    pub church_id: Uuid,
    pub notification_type: NotificationType,
    pub title: LocalizedText,
    pub body: LocalizedText,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    /// Template variables substituted into title/body at dispatch time.
    pub data: HashMap<String, String>,
}

impl SendNotification {
    pub fn to_profile(
        profile_id: Uuid,
        church_id: Uuid,
        notification_type: NotificationType,
        title: LocalizedText,
        body: LocalizedText,
    ) -> Self {
        Self {
            profile_id: Some(profile_id),
            visitor_phone: None,
            church_id,
            notification_type,
            title,
            body,
            reference_id: None,
            reference_type: None,
            data: HashMap::new(),
        }
    }

    pub fn to_visitor_phone(
        phone: impl Into<String>,
        church_id: Uuid,
        notification_type: NotificationType,
        title: LocalizedText,
        body: LocalizedText,
    ) -> Self {
        Self {
            profile_id: None,
            visitor_phone: Some(phone.into()),
            church_id,
            notification_type,
            title,
            body,
            reference_id: None,
            reference_type: None,
            data: HashMap::new(),
        }
    }

    pub fn with_reference(mut self, reference_id: Uuid, reference_type: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id);
        self.reference_type = Some(reference_type.into());
        self
    }

    pub fn with_data(mut self, data: HashMap<String, String>) -> Self {
        self.data = data;
        self
    }
}

/// Aggregate result of a fan-out to many recipients.
///
/// `sent` counts recipients whose primary ledger entry did not end up
/// `failed`. For profile recipients the primary entry is the in-app
/// row, so a failed external send still counts as sent here and shows
/// up only on its own ledger entry; visitor dispatches have no in-app
/// row and a provider failure does reduce `sent`. Per-recipient
/// failures are recorded, counted, and never raised.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchOutcome {
    pub sent: usize,
    pub total: usize,
}

/// Offset pagination for the in-app feed.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "Pagination::default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

impl Pagination {
    const MAX_LIMIT: u64 = 100;

    fn default_limit() -> u64 {
        20
    }

    /// Limit clamped to the allowed maximum.
    pub fn capped_limit(&self) -> u64 {
        self.limit.min(Self::MAX_LIMIT)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::default_limit(),
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(Locale::from_tag("ar"), Some(Locale::Ar));
        assert_eq!(Locale::from_tag("ar-EG"), Some(Locale::Ar));
        assert_eq!(Locale::from_tag("en-US"), Some(Locale::En));
        assert_eq!(Locale::from_tag("fr"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn test_status_from_provider() {
        assert_eq!(
            NotificationStatus::from_provider("delivered"),
            Some(NotificationStatus::Delivered)
        );
        assert_eq!(NotificationStatus::from_provider("bounced"), None);
    }

    #[test]
    fn test_pagination_cap() {
        let page = Pagination {
            limit: 5000,
            offset: 0,
        };
        assert_eq!(page.capped_limit(), 100);
    }
}
