//! Data models for the engagement domain.

use chrono::{DateTime, Utc};
use domain_notifications::{Locale, NotificationPreference};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// A member's engagement lifecycle state.
///
/// The absence engine only ever transitions `active → at_risk`; every
/// other transition belongs to membership administration.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "engagement_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EngagementStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "at_risk")]
    AtRisk,
    #[sea_orm(string_value = "visitor")]
    Visitor,
}

/// A member's role within their church.
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
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "member_role")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MemberRole {
    #[sea_orm(string_value = "member")]
    Member,
    #[sea_orm(string_value = "leader")]
    Leader,
    #[sea_orm(string_value = "pastor")]
    Pastor,
}

impl MemberRole {
    /// Roles allowed to preview audiences, broadcast, and receive
    /// escalations.
    pub fn is_leadership(&self) -> bool {
        matches!(self, MemberRole::Leader | MemberRole::Pastor)
    }
}

/// A church member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub church_id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// The member's own locale choice, if they made one.
    pub preferred_locale: Option<Locale>,
    pub notification_preference: NotificationPreference,
    pub engagement_status: EngagementStatus,
    pub role: MemberRole,
    pub is_active: bool,
}

/// Per-church settings the engagement subsystem reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurchSettings {
    pub id: Uuid,
    pub name: String,
    pub default_locale: Locale,
    /// Maximum hours a new visitor may go uncontacted before escalation.
    pub visitor_sla_hours: i64,
}

/// A small group within a church.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub church_id: Uuid,
    pub name: String,
    pub leader_id: Option<Uuid>,
}

/// A coarse recipient-selection rule. Resolved, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudienceTarget {
    AllMembers,
    Role { role: MemberRole },
    Group { id: Uuid },
    Ministry { id: Uuid },
    OpenVisitors,
}

/// A visitor reachable by phone, before any profile exists for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorContact {
    pub id: Uuid,
    pub phone: String,
}

/// The deduplicated result of audience resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedAudience {
    pub profile_ids: Vec<Uuid>,
    pub visitors: Vec<VisitorContact>,
}

impl ResolvedAudience {
    pub fn total(&self) -> usize {
        self.profile_ids.len() + self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Cheap preview of an audience's size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudienceCounts {
    pub profile_count: u64,
    pub visitor_count: u64,
    pub total: u64,
}

/// Publication state of an event.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "event_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// A church-wide event members register for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub church_id: Uuid,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub status: EventStatus,
}

/// State of one member's event registration.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "registration_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RegistrationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Lifecycle of a group gathering.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "gathering_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GatheringStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// One meeting of a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gathering {
    pub id: Uuid,
    pub group_id: Uuid,
    pub church_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub status: GatheringStatus,
}

/// A member's recorded attendance at one gathering.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "late")]
    Late,
    #[sea_orm(string_value = "excused")]
    Excused,
    #[sea_orm(string_value = "absent")]
    Absent,
}

/// Follow-up state of a first-time visitor.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "visitor_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VisitorStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "contacted")]
    Contacted,
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// A first-time visitor awaiting follow-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitor {
    pub id: Uuid,
    pub church_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub status: VisitorStatus,
    pub visited_at: DateTime<Utc>,
    /// Once non-null the visitor is never escalated again.
    pub escalated_at: Option<DateTime<Utc>>,
}

/// Result of one visitor SLA scan.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EscalationSummary {
    pub escalated: usize,
}

/// Result of one at-risk pass over a completed gathering.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtRiskSummary {
    pub flagged: usize,
}
