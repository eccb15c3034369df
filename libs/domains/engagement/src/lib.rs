//! Engagement Domain
//!
//! Directory read-models, audience resolution, the scheduled trigger
//! jobs (event/gathering reminders, visitor SLA escalation) and the
//! consecutive-absence at-risk engine. Sends everything through the
//! notifications domain's `Notifier` and implements its
//! `RecipientDirectory` so the dispatcher can resolve profile
//! preferences and church locales.

pub mod absence;
pub mod audience;
pub mod directory;
pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod triggers;

#[cfg(test)]
pub(crate) mod test_support;

pub use absence::{AbsenceEngine, AT_RISK_THRESHOLD, DEFAULT_LOOKBACK};
pub use audience::AudienceResolver;
pub use directory::EngagementRecipientDirectory;
pub use error::{EngagementError, EngagementResult};
pub use models::{
    AtRiskSummary, AttendanceStatus, AudienceCounts, AudienceTarget, ChurchSettings,
    EngagementStatus, EscalationSummary, Event, EventStatus, Gathering, GatheringStatus, Group,
    MemberRole, Profile, RegistrationStatus, ResolvedAudience, Visitor, VisitorContact,
    VisitorStatus,
};
pub use postgres::{
    PgDirectoryRepository, PgEventsRepository, PgGatheringsRepository, PgVisitorsRepository,
};
pub use repository::{
    DirectoryRepository, EventsRepository, GatheringsRepository, VisitorsRepository,
};
pub use triggers::TriggerJobs;
