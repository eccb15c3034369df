use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entity::{event_registrations, events};
use crate::error::EngagementResult;
use crate::models::{Event, EventStatus, RegistrationStatus};
use crate::repository::EventsRepository;

pub struct PgEventsRepository {
    db: DatabaseConnection,
}

impl PgEventsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventsRepository for PgEventsRepository {
    async fn published_starting_within(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> EngagementResult<Vec<Event>> {
        let models = events::Entity::find()
            .filter(events::Column::Status.eq(EventStatus::Published))
            .filter(events::Column::StartsAt.gte(from))
            .filter(events::Column::StartsAt.lt(until))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn confirmed_registrant_ids(&self, event_id: Uuid) -> EngagementResult<Vec<Uuid>> {
        let ids = event_registrations::Entity::find()
            .select_only()
            .column(event_registrations::Column::ProfileId)
            .filter(event_registrations::Column::EventId.eq(event_id))
            .filter(event_registrations::Column::Status.eq(RegistrationStatus::Confirmed))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }
}
