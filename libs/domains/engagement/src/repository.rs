//! Repository traits over the directory, scheduling and visitor tables.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EngagementResult;
use crate::models::{
    AttendanceStatus, ChurchSettings, Event, Gathering, Group, MemberRole, Profile, Visitor,
    VisitorContact,
};

/// Read access to the membership directory, plus the single guarded
/// write this domain owns on profiles (the at-risk flag).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Ids of all active members of a church.
    async fn active_profile_ids(&self, church_id: Uuid) -> EngagementResult<Vec<Uuid>>;

    /// Ids of active members holding a role.
    async fn profile_ids_by_role(
        &self,
        church_id: Uuid,
        role: MemberRole,
    ) -> EngagementResult<Vec<Uuid>>;

    /// Ids of a group's active members.
    async fn group_member_ids(&self, group_id: Uuid) -> EngagementResult<Vec<Uuid>>;

    /// Ids of a ministry's active members.
    async fn ministry_member_ids(&self, ministry_id: Uuid) -> EngagementResult<Vec<Uuid>>;

    /// Open (not yet converted or closed) visitors of a church.
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

    /// Active members with a leadership role (pastor or leader).
    async fn leadership_profile_ids(&self, church_id: Uuid) -> EngagementResult<Vec<Uuid>>;

    async fn profile(&self, profile_id: Uuid) -> EngagementResult<Option<Profile>>;

    async fn group(&self, group_id: Uuid) -> EngagementResult<Option<Group>>;

    async fn church_settings(&self, church_id: Uuid) -> EngagementResult<Option<ChurchSettings>>;

    /// Every church, for the per-church SLA scan.
    async fn churches(&self) -> EngagementResult<Vec<ChurchSettings>>;

    /// Compare-and-swap `active → at_risk`. Returns whether a row
    /// actually changed; false means the profile was not `active`
    /// anymore (already flagged, or raced by a concurrent run).
    async fn flag_at_risk(&self, profile_id: Uuid) -> EngagementResult<bool>;
}

/// Read access to events and their registrations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventsRepository: Send + Sync {
    /// Published events with `from <= starts_at < until`.
    async fn published_starting_within(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> EngagementResult<Vec<Event>>;

    /// Ids of profiles with a confirmed registration for an event.
    async fn confirmed_registrant_ids(&self, event_id: Uuid) -> EngagementResult<Vec<Uuid>>;
}

/// Read access to gatherings and attendance records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GatheringsRepository: Send + Sync {
    async fn find_by_id(&self, gathering_id: Uuid) -> EngagementResult<Option<Gathering>>;

    /// Scheduled gatherings with `from <= starts_at < until`.
    async fn scheduled_within(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> EngagementResult<Vec<Gathering>>;

    /// The most recent completed gatherings of a group, newest first.
    async fn recent_completed(
        &self,
        group_id: Uuid,
        limit: u64,
    ) -> EngagementResult<Vec<Gathering>>;

    /// One member's attendance per gathering; gatherings with no record
    /// are absent from the map.
    async fn attendance_statuses(
        &self,
        profile_id: Uuid,
        gathering_ids: Vec<Uuid>,
    ) -> EngagementResult<HashMap<Uuid, AttendanceStatus>>;
}

/// Read access to visitors plus the escalation marker write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitorsRepository: Send + Sync {
    /// Visitors in `new`/`assigned`, never escalated, who visited
    /// before the deadline.
    async fn overdue(
        &self,
        church_id: Uuid,
        deadline: DateTime<Utc>,
    ) -> EngagementResult<Vec<Visitor>>;

    /// Set `escalated_at = now` only if it is still null. Returns
    /// whether a row actually changed; false means a concurrent or
    /// earlier run already escalated this visitor.
    async fn mark_escalated(&self, visitor_id: Uuid) -> EngagementResult<bool>;
}
