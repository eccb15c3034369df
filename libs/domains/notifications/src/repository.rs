use async_trait::async_trait;
use uuid::Uuid;

use crate::error::NotificationResult;
use crate::models::{
    CreateNotificationLog, NotificationLog, NotificationStatus, NotificationType, Pagination,
};

/// Repository trait for the notification ledger.
///
/// The ledger is the only inter-run memory the trigger jobs have, so the
/// dedup queries here are what makes rescans idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationLogRepository: Send + Sync {
    /// Append a ledger entry.
    async fn create(&self, input: CreateNotificationLog) -> NotificationResult<NotificationLog>;

    /// Record the outcome of a provider call on an existing entry.
    async fn mark_outcome(
        &self,
        id: Uuid,
        status: NotificationStatus,
        external_message_id: Option<String>,
        error_message: Option<String>,
    ) -> NotificationResult<NotificationLog>;

    /// Of the given candidate reference ids, return those that already
    /// have a dispatched entry of this type (sent, delivered or read).
    async fn sent_reference_ids(
        &self,
        notification_type: NotificationType,
        reference_ids: Vec<Uuid>,
    ) -> NotificationResult<Vec<Uuid>>;

    /// Update the entry matching a provider message id. Returns false
    /// when no entry matches (the callback is then ignored).
    async fn update_status_by_external_id(
        &self,
        external_id: &str,
        status: NotificationStatus,
    ) -> NotificationResult<bool>;

    /// A recipient's own in-app feed, newest first.
    async fn list_in_app(
        &self,
        profile_id: Uuid,
        page: Pagination,
    ) -> NotificationResult<Vec<NotificationLog>>;

    /// Unread in-app entries for a recipient.
    async fn unread_count(&self, profile_id: Uuid) -> NotificationResult<u64>;

    /// Mark one of the caller's own in-app entries read. Returns false
    /// when the entry does not exist or belongs to someone else.
    async fn mark_read(&self, id: Uuid, profile_id: Uuid) -> NotificationResult<bool>;

    /// Mark all of the caller's unread in-app entries read. Returns the
    /// number of rows touched.
    async fn mark_all_read(&self, profile_id: Uuid) -> NotificationResult<u64>;
}
