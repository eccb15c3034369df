//! Hand-rolled mocks for traits owned by the notifications crate, whose
//! automocks are not visible across the crate boundary.

use async_trait::async_trait;
use domain_notifications::{
    BatchOutcome, CreateNotificationLog, NotificationLog, NotificationLogRepository,
    NotificationResult, NotificationStatus, NotificationType, Notifier, Pagination,
    SendNotification,
};
use uuid::Uuid;

mockall::mock! {
    pub Ledger {}

    #[async_trait]
    impl NotificationLogRepository for Ledger {
        async fn create(&self, input: CreateNotificationLog) -> NotificationResult<NotificationLog>;
        async fn mark_outcome(
            &self,
            id: Uuid,
            status: NotificationStatus,
            external_message_id: Option<String>,
            error_message: Option<String>,
        ) -> NotificationResult<NotificationLog>;
        async fn sent_reference_ids(
            &self,
            notification_type: NotificationType,
            reference_ids: Vec<Uuid>,
        ) -> NotificationResult<Vec<Uuid>>;
        async fn update_status_by_external_id(
            &self,
            external_id: &str,
            status: NotificationStatus,
        ) -> NotificationResult<bool>;
        async fn list_in_app(
            &self,
            profile_id: Uuid,
            page: Pagination,
        ) -> NotificationResult<Vec<NotificationLog>>;
        async fn unread_count(&self, profile_id: Uuid) -> NotificationResult<u64>;
        async fn mark_read(&self, id: Uuid, profile_id: Uuid) -> NotificationResult<bool>;
        async fn mark_all_read(&self, profile_id: Uuid) -> NotificationResult<u64>;
    }
}

mockall::mock! {
    pub TestNotifier {}

    #[async_trait]
    impl Notifier for TestNotifier {
        async fn send_notification(
            &self,
            input: SendNotification,
        ) -> NotificationResult<NotificationLog>;
        async fn send_batch(&self, inputs: Vec<SendNotification>) -> BatchOutcome;
    }
}
