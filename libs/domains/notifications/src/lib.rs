//! Notifications Domain
//!
//! Multi-locale, multi-channel notification delivery with a persistent
//! ledger of every attempt.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────┐
//! │ Trigger Job / API     │  ← decides who is notified about what
//! └──────────┬────────────┘
//!            │ one call per recipient
//! ┌──────────▼────────────┐
//! │ NotificationDispatcher│  ← resolves locale + channel preference,
//! └──────────┬────────────┘    renders, writes the ledger entry
//!            │
//! ┌──────────▼────────────┐
//! │ ProviderRegistry      │  ← WhatsApp, SMS, SMTP; in-app is a
//! └──────────┬────────────┘    ledger-only write
//!            │
//! ┌──────────▼────────────┐
//! │ notification_logs     │  ← status reconciled later by the
//! └───────────────────────┘    webhook status ingestor
//! ```
//!
//! Provider failures are recorded on the ledger entry as `failed`, never
//! raised out of a batch; delivery-status callbacks from the external
//! provider are matched back onto entries by external message id.

pub mod dispatcher;
pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod providers;
pub mod repository;
pub mod templates;
pub mod webhook;

pub use dispatcher::{NotificationDispatcher, Notifier, RecipientDirectory, RecipientProfile};
pub use error::{NotificationError, NotificationResult};
pub use models::{
    BatchOutcome, Channel, CreateNotificationLog, Locale, LocalizedText, NotificationLog,
    NotificationPreference, NotificationStatus, NotificationType, Pagination, SendNotification,
};
pub use postgres::PgNotificationLogRepository;
pub use providers::{ChannelProvider, ProviderRegistry, RenderedMessage, SentMessage};
pub use repository::NotificationLogRepository;
pub use templates::{interpolate, NotificationTemplate, TemplateCatalog};
pub use webhook::{ingest_status_updates, StatusUpdate};
