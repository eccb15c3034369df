//! Consecutive-absence streaks and the `active → at_risk` transition.

use std::collections::HashMap;
use std::sync::Arc;

use domain_notifications::{NotificationType, Notifier, SendNotification, TemplateCatalog};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{EngagementError, EngagementResult};
use crate::models::{AtRiskSummary, AttendanceStatus, EngagementStatus, GatheringStatus, Group};
use crate::repository::{DirectoryRepository, GatheringsRepository};

/// How many completed gatherings a streak scan looks back over.
pub const DEFAULT_LOOKBACK: u64 = 6;

/// Streak length at which an active member is flagged at risk.
pub const AT_RISK_THRESHOLD: u32 = 2;

pub struct AbsenceEngine {
    directory: Arc<dyn DirectoryRepository>,
    gatherings: Arc<dyn GatheringsRepository>,
    notifier: Arc<dyn Notifier>,
    catalog: TemplateCatalog,
}

impl AbsenceEngine {
    pub fn new(
        directory: Arc<dyn DirectoryRepository>,
        gatherings: Arc<dyn GatheringsRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            directory,
            gatherings,
            notifier,
            catalog: TemplateCatalog::new(),
        }
    }

    /// Count the member's most recent consecutive absences from a
    /// group's completed gatherings, newest first. A missing attendance
    /// record counts as absent; the first present/late/excused record
    /// stops the count.
    pub async fn consecutive_absences(
        &self,
        profile_id: Uuid,
        group_id: Uuid,
        lookback: u64,
    ) -> EngagementResult<u32> {
        let recent = self.gatherings.recent_completed(group_id, lookback).await?;
        let statuses: HashMap<Uuid, AttendanceStatus> = self
            .gatherings
            .attendance_statuses(profile_id, recent.iter().map(|g| g.id).collect())
            .await?;

        let mut streak = 0;
        for gathering in &recent {
            match statuses.get(&gathering.id) {
                None | Some(AttendanceStatus::Absent) => streak += 1,
                Some(_) => break,
            }
        }
        Ok(streak)
    }

    /// After a gathering completes, flag every active group member whose
    /// streak reached the threshold and notify the group's leadership.
    /// The flag is a compare-and-swap on the profile row, so a repeated
    /// or concurrent pass flags and notifies each member at most once.
    #[instrument(skip(self))]
    pub async fn check_and_flag_at_risk(
        &self,
        gathering_id: Uuid,
    ) -> EngagementResult<AtRiskSummary> {
        let gathering = self
            .gatherings
            .find_by_id(gathering_id)
            .await?
            .ok_or_else(|| EngagementError::NotFound(format!("gathering {}", gathering_id)))?;

        if gathering.status != GatheringStatus::Completed {
            return Err(EngagementError::Validation(format!(
                "gathering {} is not completed",
                gathering_id
            )));
        }

        let group = self
            .directory
            .group(gathering.group_id)
            .await?
            .ok_or_else(|| EngagementError::NotFound(format!("group {}", gathering.group_id)))?;

        let mut summary = AtRiskSummary::default();
        for member_id in self.directory.group_member_ids(group.id).await? {
            match self.check_member(&group, member_id).await {
                Ok(true) => summary.flagged += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(profile_id = %member_id, error = %err, "At-risk check failed, continuing");
                }
            }
        }

        info!(gathering_id = %gathering_id, flagged = summary.flagged, "At-risk pass finished");
        Ok(summary)
    }

    /// Returns whether this call flagged the member.
    async fn check_member(&self, group: &Group, member_id: Uuid) -> EngagementResult<bool> {
        let Some(profile) = self.directory.profile(member_id).await? else {
            return Ok(false);
        };
        if profile.engagement_status != EngagementStatus::Active {
            return Ok(false);
        }

        let streak = self
            .consecutive_absences(member_id, group.id, DEFAULT_LOOKBACK)
            .await?;
        if streak < AT_RISK_THRESHOLD {
            return Ok(false);
        }

        // CAS guards against a concurrent pass over the same gathering:
        // whichever run flips the row sends the one notification.
        if !self.directory.flag_at_risk(member_id).await? {
            debug!(profile_id = %member_id, "Already flagged, skipping notification");
            return Ok(false);
        }

        // Notification failure must not undo the flag; it is logged and
        // the member stays flagged.
        if let Err(err) = self.notify_leadership(group, &profile.full_name, streak).await {
            warn!(profile_id = %member_id, error = %err, "At-risk notification failed");
        }
        Ok(true)
    }

    async fn notify_leadership(
        &self,
        group: &Group,
        member_name: &str,
        streak: u32,
    ) -> EngagementResult<()> {
        let Some(template) = self.catalog.get(NotificationType::AtRiskMember) else {
            return Ok(());
        };

        let recipients = match group.leader_id {
            Some(leader_id) => vec![leader_id],
            None => self.directory.leadership_profile_ids(group.church_id).await?,
        };

        let vars = HashMap::from([
            ("member_name".to_string(), member_name.to_string()),
            ("streak".to_string(), streak.to_string()),
            ("group_name".to_string(), group.name.clone()),
        ]);

        let batch: Vec<SendNotification> = recipients
            .into_iter()
            .map(|profile_id| {
                SendNotification::to_profile(
                    profile_id,
                    group.church_id,
                    NotificationType::AtRiskMember,
                    template.title.clone(),
                    template.body.clone(),
                )
                .with_data(vars.clone())
            })
            .collect();

        let outcome = self.notifier.send_batch(batch).await;
        if outcome.sent < outcome.total {
            warn!(
                group_id = %group.id,
                sent = outcome.sent,
                total = outcome.total,
                "Some at-risk notifications failed"
            );
        }
        Ok(())
    }
}
