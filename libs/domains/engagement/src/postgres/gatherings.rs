use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entity::{attendance_records, gatherings};
use crate::error::EngagementResult;
use crate::models::{AttendanceStatus, Gathering, GatheringStatus};
use crate::repository::GatheringsRepository;

pub struct PgGatheringsRepository {
    db: DatabaseConnection,
}

impl PgGatheringsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GatheringsRepository for PgGatheringsRepository {
    async fn find_by_id(&self, gathering_id: Uuid) -> EngagementResult<Option<Gathering>> {
        let model = gatherings::Entity::find_by_id(gathering_id)
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn scheduled_within(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> EngagementResult<Vec<Gathering>> {
        let models = gatherings::Entity::find()
            .filter(gatherings::Column::Status.eq(GatheringStatus::Scheduled))
            .filter(gatherings::Column::StartsAt.gte(from))
            .filter(gatherings::Column::StartsAt.lt(until))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn recent_completed(
        &self,
        group_id: Uuid,
        limit: u64,
    ) -> EngagementResult<Vec<Gathering>> {
        let models = gatherings::Entity::find()
            .filter(gatherings::Column::GroupId.eq(group_id))
            .filter(gatherings::Column::Status.eq(GatheringStatus::Completed))
            .order_by_desc(gatherings::Column::StartsAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn attendance_statuses(
        &self,
        profile_id: Uuid,
        gathering_ids: Vec<Uuid>,
    ) -> EngagementResult<HashMap<Uuid, AttendanceStatus>> {
        if gathering_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let records = attendance_records::Entity::find()
            .filter(attendance_records::Column::ProfileId.eq(profile_id))
            .filter(attendance_records::Column::GatheringId.is_in(gathering_ids))
            .all(&self.db)
            .await?;

        Ok(records
            .into_iter()
            .map(|record| (record.gathering_id, record.status))
            .collect())
    }
}
