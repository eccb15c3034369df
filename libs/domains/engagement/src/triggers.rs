//! Scheduled trigger jobs: the idempotent scan-and-send pattern.
//!
//! Each job is invoked by an external periodic caller, at least once per
//! period and possibly concurrently. There is no inter-run memory beyond
//! the notification ledger and the visitor escalation marker, so every
//! run re-derives its work from persisted state:
//!
//! `candidates = scan(window); already = ledger; dispatch(candidates - already)`
//!
//! Dedup is at the occasion level: one prior sent entry for an event or
//! gathering suppresses the whole occasion. A run interrupted mid-batch
//! can therefore re-notify some recipients of that occasion on rerun;
//! reminders are at-least-once per occasion by design.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use domain_notifications::{
    BatchOutcome, NotificationLogRepository, NotificationType, Notifier, SendNotification,
    TemplateCatalog,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::EngagementResult;
use crate::models::{EscalationSummary, Event, Gathering};
use crate::repository::{
    DirectoryRepository, EventsRepository, GatheringsRepository, VisitorsRepository,
};

/// How far ahead the reminder scans look.
pub const REMINDER_WINDOW_HOURS: i64 = 24;

pub struct TriggerJobs {
    directory: Arc<dyn DirectoryRepository>,
    events: Arc<dyn EventsRepository>,
    gatherings: Arc<dyn GatheringsRepository>,
    visitors: Arc<dyn VisitorsRepository>,
    ledger: Arc<dyn NotificationLogRepository>,
    notifier: Arc<dyn Notifier>,
    catalog: TemplateCatalog,
}

impl TriggerJobs {
    pub fn new(
        directory: Arc<dyn DirectoryRepository>,
        events: Arc<dyn EventsRepository>,
        gatherings: Arc<dyn GatheringsRepository>,
        visitors: Arc<dyn VisitorsRepository>,
        ledger: Arc<dyn NotificationLogRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            directory,
            events,
            gatherings,
            visitors,
            ledger,
            notifier,
            catalog: TemplateCatalog::new(),
        }
    }

    /// Occasions from `candidates` with no sent ledger entry of `kind`.
    async fn without_sent_entry(
        &self,
        kind: NotificationType,
        candidate_ids: Vec<Uuid>,
    ) -> EngagementResult<HashSet<Uuid>> {
        let already: HashSet<Uuid> = self
            .ledger
            .sent_reference_ids(kind, candidate_ids.clone())
            .await?
            .into_iter()
            .collect();

        Ok(candidate_ids
            .into_iter()
            .filter(|id| !already.contains(id))
            .collect())
    }

    /// Remind confirmed registrants of published events starting within
    /// the next 24 hours, one occasion at a time.
    #[instrument(skip(self))]
    pub async fn run_event_reminders(&self) -> EngagementResult<BatchOutcome> {
        let now = Utc::now();
        let candidates = self
            .events
            .published_starting_within(now, now + Duration::hours(REMINDER_WINDOW_HOURS))
            .await?;

        let pending = self
            .without_sent_entry(
                NotificationType::EventReminder,
                candidates.iter().map(|e| e.id).collect(),
            )
            .await?;

        let mut outcome = BatchOutcome::default();
        for event in candidates {
            if !pending.contains(&event.id) {
                debug!(event_id = %event.id, "Reminder already sent, skipping");
                continue;
            }
            match self.remind_event(&event).await {
                Ok(batch) => {
                    outcome.sent += batch.sent;
                    outcome.total += batch.total;
                }
                Err(err) => {
                    warn!(event_id = %event.id, error = %err, "Event reminder failed, continuing");
                }
            }
        }

        info!(sent = outcome.sent, total = outcome.total, "Event reminder scan finished");
        Ok(outcome)
    }

    async fn remind_event(&self, event: &Event) -> EngagementResult<BatchOutcome> {
        let registrants = self.events.confirmed_registrant_ids(event.id).await?;
        if registrants.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let Some(template) = self.catalog.get(NotificationType::EventReminder) else {
            return Ok(BatchOutcome::default());
        };

        let vars = HashMap::from([
            ("event_title".to_string(), event.title.clone()),
            ("starts_at".to_string(), format_when(event.starts_at)),
        ]);

        let batch: Vec<SendNotification> = registrants
            .into_iter()
            .map(|profile_id| {
                SendNotification::to_profile(
                    profile_id,
                    event.church_id,
                    NotificationType::EventReminder,
                    template.title.clone(),
                    template.body.clone(),
                )
                .with_reference(event.id, "event")
                .with_data(vars.clone())
            })
            .collect();

        Ok(self.notifier.send_batch(batch).await)
    }

    /// Remind group members of scheduled gatherings within the next
    /// 24 hours.
    #[instrument(skip(self))]
    pub async fn run_gathering_reminders(&self) -> EngagementResult<BatchOutcome> {
        let now = Utc::now();
        let candidates = self
            .gatherings
            .scheduled_within(now, now + Duration::hours(REMINDER_WINDOW_HOURS))
            .await?;

        let pending = self
            .without_sent_entry(
                NotificationType::GatheringReminder,
                candidates.iter().map(|g| g.id).collect(),
            )
            .await?;

        let mut outcome = BatchOutcome::default();
        for gathering in candidates {
            if !pending.contains(&gathering.id) {
                debug!(gathering_id = %gathering.id, "Reminder already sent, skipping");
                continue;
            }
            match self.remind_gathering(&gathering).await {
                Ok(batch) => {
                    outcome.sent += batch.sent;
                    outcome.total += batch.total;
                }
                Err(err) => {
                    warn!(
                        gathering_id = %gathering.id,
                        error = %err,
                        "Gathering reminder failed, continuing"
                    );
                }
            }
        }

        info!(sent = outcome.sent, total = outcome.total, "Gathering reminder scan finished");
        Ok(outcome)
    }

    async fn remind_gathering(&self, gathering: &Gathering) -> EngagementResult<BatchOutcome> {
        let members = self.directory.group_member_ids(gathering.group_id).await?;
        if members.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let Some(template) = self.catalog.get(NotificationType::GatheringReminder) else {
            return Ok(BatchOutcome::default());
        };

        let group_name = self
            .directory
            .group(gathering.group_id)
            .await?
            .map(|group| group.name)
            .unwrap_or_default();

        let vars = HashMap::from([
            ("group_name".to_string(), group_name),
            ("starts_at".to_string(), format_when(gathering.starts_at)),
        ]);

        let batch: Vec<SendNotification> = members
            .into_iter()
            .map(|profile_id| {
                SendNotification::to_profile(
                    profile_id,
                    gathering.church_id,
                    NotificationType::GatheringReminder,
                    template.title.clone(),
                    template.body.clone(),
                )
                .with_reference(gathering.id, "gathering")
                .with_data(vars.clone())
            })
            .collect();

        Ok(self.notifier.send_batch(batch).await)
    }

    /// Escalate visitors uncontacted past their church's SLA to that
    /// church's leadership. The escalation marker is committed before
    /// dispatch, so a concurrent or repeated scan cannot double-escalate
    /// and a notification failure cannot reopen the window.
    #[instrument(skip(self))]
    pub async fn run_visitor_sla_scan(&self) -> EngagementResult<EscalationSummary> {
        let now = Utc::now();
        let mut summary = EscalationSummary::default();

        for church in self.directory.churches().await? {
            let deadline = now - Duration::hours(church.visitor_sla_hours);
            let overdue = match self.visitors.overdue(church.id, deadline).await {
                Ok(overdue) => overdue,
                Err(err) => {
                    warn!(church_id = %church.id, error = %err, "Overdue scan failed, continuing");
                    continue;
                }
            };
            if overdue.is_empty() {
                continue;
            }

            let leadership = match self.directory.leadership_profile_ids(church.id).await {
                Ok(leadership) => leadership,
                Err(err) => {
                    warn!(church_id = %church.id, error = %err, "Leadership lookup failed, continuing");
                    continue;
                }
            };

            let Some(template) = self.catalog.get(NotificationType::VisitorSlaEscalation) else {
                continue;
            };

            for visitor in overdue {
                match self.visitors.mark_escalated(visitor.id).await {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!(visitor_id = %visitor.id, "Already escalated by a concurrent run");
                        continue;
                    }
                    Err(err) => {
                        warn!(visitor_id = %visitor.id, error = %err, "Escalation marker failed, continuing");
                        continue;
                    }
                }
                summary.escalated += 1;

                let vars = HashMap::from([
                    ("visitor_name".to_string(), visitor.full_name.clone()),
                    ("visited_at".to_string(), format_when(visitor.visited_at)),
                    ("sla_hours".to_string(), church.visitor_sla_hours.to_string()),
                ]);

                let batch: Vec<SendNotification> = leadership
                    .iter()
                    .map(|&profile_id| {
                        SendNotification::to_profile(
                            profile_id,
                            church.id,
                            NotificationType::VisitorSlaEscalation,
                            template.title.clone(),
                            template.body.clone(),
                        )
                        .with_reference(visitor.id, "visitor")
                        .with_data(vars.clone())
                    })
                    .collect();

                let outcome = self.notifier.send_batch(batch).await;
                if outcome.sent < outcome.total {
                    warn!(
                        visitor_id = %visitor.id,
                        sent = outcome.sent,
                        total = outcome.total,
                        "Some escalation notifications failed"
                    );
                }
            }
        }

        info!(escalated = summary.escalated, "Visitor SLA scan finished");
        Ok(summary)
    }
}

fn format_when(when: DateTime<Utc>) -> String {
    when.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChurchSettings, EventStatus, Visitor, VisitorStatus};
    use crate::repository::{
        MockDirectoryRepository, MockEventsRepository, MockGatheringsRepository,
        MockVisitorsRepository,
    };
    use crate::test_support::{MockLedger, MockTestNotifier};
    use domain_notifications::Locale;

    fn event(id: Uuid, church_id: Uuid) -> Event {
        Event {
            id,
            church_id,
            title: "Youth Conference".to_string(),
            starts_at: Utc::now() + Duration::hours(3),
            status: EventStatus::Published,
        }
    }

    fn jobs(
        directory: MockDirectoryRepository,
        events: MockEventsRepository,
        gatherings: MockGatheringsRepository,
        visitors: MockVisitorsRepository,
        ledger: MockLedger,
        notifier: MockTestNotifier,
    ) -> TriggerJobs {
        TriggerJobs::new(
            Arc::new(directory),
            Arc::new(events),
            Arc::new(gatherings),
            Arc::new(visitors),
            Arc::new(ledger),
            Arc::new(notifier),
        )
    }

    #[tokio::test]
    async fn test_event_reminders_skip_already_sent_occasions() {
        let church_id = Uuid::now_v7();
        let fresh = Uuid::now_v7();
        let already_sent = Uuid::now_v7();

        let mut events = MockEventsRepository::new();
        events
            .expect_published_starting_within()
            .returning(move |_, _| Ok(vec![event(fresh, church_id), event(already_sent, church_id)]));
        events
            .expect_confirmed_registrant_ids()
            .withf(move |id| *id == fresh)
            .times(1)
            .returning(|_| Ok(vec![Uuid::now_v7(), Uuid::now_v7()]));

        let mut ledger = MockLedger::new();
        ledger
            .expect_sent_reference_ids()
            .returning(move |_, _| Ok(vec![already_sent]));

        let mut notifier = MockTestNotifier::new();
        notifier
            .expect_send_batch()
            .times(1)
            .withf(move |batch| batch.len() == 2 && batch[0].reference_id == Some(fresh))
            .returning(|batch| BatchOutcome {
                sent: batch.len(),
                total: batch.len(),
            });

        let jobs = jobs(
            MockDirectoryRepository::new(),
            events,
            MockGatheringsRepository::new(),
            MockVisitorsRepository::new(),
            ledger,
            notifier,
        );

        let outcome = jobs.run_event_reminders().await.unwrap();
        assert_eq!(outcome, BatchOutcome { sent: 2, total: 2 });
    }

    #[tokio::test]
    async fn test_second_run_sends_nothing() {
        let church_id = Uuid::now_v7();
        let occasion = Uuid::now_v7();

        let mut events = MockEventsRepository::new();
        events
            .expect_published_starting_within()
            .returning(move |_, _| Ok(vec![event(occasion, church_id)]));
        events.expect_confirmed_registrant_ids().never();

        let mut ledger = MockLedger::new();
        ledger
            .expect_sent_reference_ids()
            .returning(move |_, _| Ok(vec![occasion]));

        let mut notifier = MockTestNotifier::new();
        notifier.expect_send_batch().never();

        let jobs = jobs(
            MockDirectoryRepository::new(),
            events,
            MockGatheringsRepository::new(),
            MockVisitorsRepository::new(),
            ledger,
            notifier,
        );

        let outcome = jobs.run_event_reminders().await.unwrap();
        assert_eq!(outcome, BatchOutcome::default());
    }

    fn church(id: Uuid) -> ChurchSettings {
        ChurchSettings {
            id,
            name: "St. Mark".to_string(),
            default_locale: Locale::Ar,
            visitor_sla_hours: 48,
        }
    }

    fn overdue_visitor(church_id: Uuid) -> Visitor {
        Visitor {
            id: Uuid::now_v7(),
            church_id,
            full_name: "Sara Nabil".to_string(),
            phone: "+201000000003".to_string(),
            status: VisitorStatus::New,
            visited_at: Utc::now() - Duration::hours(72),
            escalated_at: None,
        }
    }

    #[tokio::test]
    async fn test_visitor_escalated_and_leadership_notified() {
        let church_id = Uuid::now_v7();
        let leader = Uuid::now_v7();

        let mut directory = MockDirectoryRepository::new();
        directory
            .expect_churches()
            .returning(move || Ok(vec![church(church_id)]));
        directory
            .expect_leadership_profile_ids()
            .returning(move |_| Ok(vec![leader]));

        let mut visitors = MockVisitorsRepository::new();
        visitors
            .expect_overdue()
            .returning(move |_, _| Ok(vec![overdue_visitor(church_id)]));
        visitors
            .expect_mark_escalated()
            .times(1)
            .returning(|_| Ok(true));

        let mut notifier = MockTestNotifier::new();
        notifier
            .expect_send_batch()
            .times(1)
            .withf(move |batch| batch.len() == 1 && batch[0].profile_id == Some(leader))
            .returning(|batch| BatchOutcome {
                sent: batch.len(),
                total: batch.len(),
            });

        let jobs = jobs(
            directory,
            MockEventsRepository::new(),
            MockGatheringsRepository::new(),
            visitors,
            MockLedger::new(),
            notifier,
        );

        let summary = jobs.run_visitor_sla_scan().await.unwrap();
        assert_eq!(summary.escalated, 1);
    }

    #[tokio::test]
    async fn test_raced_escalation_skips_notification() {
        let church_id = Uuid::now_v7();

        let mut directory = MockDirectoryRepository::new();
        directory
            .expect_churches()
            .returning(move || Ok(vec![church(church_id)]));
        directory
            .expect_leadership_profile_ids()
            .returning(|_| Ok(vec![Uuid::now_v7()]));

        let mut visitors = MockVisitorsRepository::new();
        visitors
            .expect_overdue()
            .returning(move |_, _| Ok(vec![overdue_visitor(church_id)]));
        // A concurrent run already set the marker.
        visitors.expect_mark_escalated().returning(|_| Ok(false));

        let mut notifier = MockTestNotifier::new();
        notifier.expect_send_batch().never();

        let jobs = jobs(
            directory,
            MockEventsRepository::new(),
            MockGatheringsRepository::new(),
            visitors,
            MockLedger::new(),
            notifier,
        );

        let summary = jobs.run_visitor_sla_scan().await.unwrap();
        assert_eq!(summary.escalated, 0);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_undo_escalation() {
        let church_id = Uuid::now_v7();

        let mut directory = MockDirectoryRepository::new();
        directory
            .expect_churches()
            .returning(move || Ok(vec![church(church_id)]));
        directory
            .expect_leadership_profile_ids()
            .returning(|_| Ok(vec![Uuid::now_v7()]));

        let mut visitors = MockVisitorsRepository::new();
        visitors
            .expect_overdue()
            .returning(move |_, _| Ok(vec![overdue_visitor(church_id)]));
        visitors
            .expect_mark_escalated()
            .times(1)
            .returning(|_| Ok(true));

        let mut notifier = MockTestNotifier::new();
        notifier
            .expect_send_batch()
            .returning(|batch| BatchOutcome {
                sent: 0,
                total: batch.len(),
            });

        let jobs = jobs(
            directory,
            MockEventsRepository::new(),
            MockGatheringsRepository::new(),
            visitors,
            MockLedger::new(),
            notifier,
        );

        // The marker is committed even though every dispatch failed.
        let summary = jobs.run_visitor_sla_scan().await.unwrap();
        assert_eq!(summary.escalated, 1);
    }
}
