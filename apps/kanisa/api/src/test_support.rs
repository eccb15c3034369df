//! Hand-rolled mocks and an `AppState` builder for handler tests.
//! Automocks of traits owned by the domain crates are hidden behind
//! their own `cfg(test)`, so the mocks live here.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_config::database::DatabaseConfig;
use domain_engagement::{
    AbsenceEngine, AttendanceStatus, AudienceResolver, ChurchSettings, DirectoryRepository,
    EngagementResult, Event, EventsRepository, Gathering, GatheringsRepository, Group, MemberRole,
    Profile, TriggerJobs, Visitor, VisitorContact, VisitorsRepository,
};
use domain_notifications::{
    BatchOutcome, CreateNotificationLog, NotificationLog, NotificationLogRepository,
    NotificationResult, NotificationStatus, NotificationType, Notifier, Pagination,
    SendNotification,
};
use sea_orm::{DatabaseBackend, MockDatabase};
use uuid::Uuid;

use crate::auth::MockSessionResolver;
use crate::config::{Config, Environment};
use crate::state::AppState;

mockall::mock! {
    pub Directory {}

    #[async_trait]
    impl DirectoryRepository for Directory {
        async fn active_profile_ids(&self, church_id: Uuid) -> EngagementResult<Vec<Uuid>>;
        async fn profile_ids_by_role(
            &self,
            church_id: Uuid,
            role: MemberRole,
        ) -> EngagementResult<Vec<Uuid>>;
        async fn group_member_ids(&self, group_id: Uuid) -> EngagementResult<Vec<Uuid>>;
        async fn ministry_member_ids(&self, ministry_id: Uuid) -> EngagementResult<Vec<Uuid>>;
        async fn open_visitors(&self, church_id: Uuid) -> EngagementResult<Vec<VisitorContact>>;
        async fn count_active_profiles(&self, church_id: Uuid) -> EngagementResult<u64>;
        async fn count_profiles_by_role(
            &self,
            church_id: Uuid,
            role: MemberRole,
        ) -> EngagementResult<u64>;
        async fn count_group_members(&self, group_id: Uuid) -> EngagementResult<u64>;
        async fn count_ministry_members(&self, ministry_id: Uuid) -> EngagementResult<u64>;
        async fn count_open_visitors(&self, church_id: Uuid) -> EngagementResult<u64>;
        async fn leadership_profile_ids(&self, church_id: Uuid) -> EngagementResult<Vec<Uuid>>;
        async fn profile(&self, profile_id: Uuid) -> EngagementResult<Option<Profile>>;
        async fn group(&self, group_id: Uuid) -> EngagementResult<Option<Group>>;
        async fn church_settings(&self, church_id: Uuid) -> EngagementResult<Option<ChurchSettings>>;
        async fn churches(&self) -> EngagementResult<Vec<ChurchSettings>>;
        async fn flag_at_risk(&self, profile_id: Uuid) -> EngagementResult<bool>;
    }
}

mockall::mock! {
    pub Events {}

    #[async_trait]
    impl EventsRepository for Events {
        async fn published_starting_within(
            &self,
            from: DateTime<Utc>,
            until: DateTime<Utc>,
        ) -> EngagementResult<Vec<Event>>;
        async fn confirmed_registrant_ids(&self, event_id: Uuid) -> EngagementResult<Vec<Uuid>>;
    }
}

mockall::mock! {
    pub Gatherings {}

    #[async_trait]
    impl GatheringsRepository for Gatherings {
        async fn find_by_id(&self, gathering_id: Uuid) -> EngagementResult<Option<Gathering>>;
        async fn scheduled_within(
            &self,
            from: DateTime<Utc>,
            until: DateTime<Utc>,
        ) -> EngagementResult<Vec<Gathering>>;
        async fn recent_completed(
            &self,
            group_id: Uuid,
            limit: u64,
        ) -> EngagementResult<Vec<Gathering>>;
        async fn attendance_statuses(
            &self,
            profile_id: Uuid,
            gathering_ids: Vec<Uuid>,
        ) -> EngagementResult<HashMap<Uuid, AttendanceStatus>>;
    }
}

mockall::mock! {
    pub Visitors {}

    #[async_trait]
    impl VisitorsRepository for Visitors {
        async fn overdue(
            &self,
            church_id: Uuid,
            deadline: DateTime<Utc>,
        ) -> EngagementResult<Vec<Visitor>>;
        async fn mark_escalated(&self, visitor_id: Uuid) -> EngagementResult<bool>;
    }
}

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

pub fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        database: DatabaseConfig::new("postgres://localhost/kanisa_test"),
        host: "127.0.0.1".to_string(),
        port: 0,
        trigger_secret: "trigger-secret".to_string(),
        webhook_verify_token: "verify-token".to_string(),
        auth_service_url: "http://localhost:4000".to_string(),
    }
}

/// An `AppState` whose collaborators are expectation-free mocks; tests
/// exercising a handler set expectations on their own mock instances
/// instead.
pub fn test_state() -> AppState {
    let directory: Arc<dyn DirectoryRepository> = Arc::new(MockDirectory::new());
    let gatherings: Arc<dyn GatheringsRepository> = Arc::new(MockGatherings::new());
    let ledger: Arc<dyn NotificationLogRepository> = Arc::new(MockLedger::new());
    let notifier: Arc<dyn Notifier> = Arc::new(MockTestNotifier::new());

    AppState {
        config: Arc::new(test_config()),
        db: MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        sessions: Arc::new(MockSessionResolver::new()),
        audience: Arc::new(AudienceResolver::new(directory.clone())),
        notifier: notifier.clone(),
        ledger: ledger.clone(),
        triggers: Arc::new(TriggerJobs::new(
            directory.clone(),
            Arc::new(MockEvents::new()),
            gatherings.clone(),
            Arc::new(MockVisitors::new()),
            ledger,
            notifier.clone(),
        )),
        absence: Arc::new(AbsenceEngine::new(directory, gatherings, notifier)),
    }
}
