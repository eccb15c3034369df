use async_trait::async_trait;
use chrono::Utc;
use database::BaseRepository;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{NotificationError, NotificationResult},
    models::{
        Channel, CreateNotificationLog, NotificationLog, NotificationStatus, NotificationType,
        Pagination,
    },
    repository::NotificationLogRepository,
};

pub struct PgNotificationLogRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgNotificationLogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl NotificationLogRepository for PgNotificationLogRepository {
    async fn create(&self, input: CreateNotificationLog) -> NotificationResult<NotificationLog> {
        let active_model: entity::ActiveModel = input.into();
        let model = self.base.insert(active_model).await?;

        tracing::debug!(
            notification_id = %model.id,
            channel = %model.channel,
            notification_type = %model.notification_type,
            "Created ledger entry"
        );
        Ok(model.into())
    }

    async fn mark_outcome(
        &self,
        id: Uuid,
        status: NotificationStatus,
        external_message_id: Option<String>,
        error_message: Option<String>,
    ) -> NotificationResult<NotificationLog> {
        let model = self
            .base
            .find_by_id(id)
            .await?
            .ok_or_else(|| NotificationError::NotFound(format!("ledger entry {}", id)))?;

        let mut active = model.into_active_model();
        active.status = Set(status);
        if external_message_id.is_some() {
            active.external_message_id = Set(external_message_id);
        }
        if error_message.is_some() {
            active.error_message = Set(error_message);
        }

        let updated = self.base.update(active).await?;
        Ok(updated.into())
    }

    async fn sent_reference_ids(
        &self,
        notification_type: NotificationType,
        reference_ids: Vec<Uuid>,
    ) -> NotificationResult<Vec<Uuid>> {
        if reference_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<Option<Uuid>> = entity::Entity::find()
            .select_only()
            .column(entity::Column::ReferenceId)
            .distinct()
            .filter(entity::Column::NotificationType.eq(notification_type))
            .filter(entity::Column::Status.is_in([
                NotificationStatus::Sent,
                NotificationStatus::Delivered,
                NotificationStatus::Read,
            ]))
            .filter(entity::Column::ReferenceId.is_in(reference_ids))
            .into_tuple()
            .all(self.base.db())
            .await?;

        Ok(rows.into_iter().flatten().collect())
    }

    async fn update_status_by_external_id(
        &self,
        external_id: &str,
        status: NotificationStatus,
    ) -> NotificationResult<bool> {
        let Some(model) = entity::Entity::find()
            .filter(entity::Column::ExternalMessageId.eq(external_id))
            .one(self.base.db())
            .await?
        else {
            return Ok(false);
        };

        let mut active = model.into_active_model();
        active.status = Set(status);
        self.base.update(active).await?;
        Ok(true)
    }

    async fn list_in_app(
        &self,
        profile_id: Uuid,
        page: Pagination,
    ) -> NotificationResult<Vec<NotificationLog>> {
        let models = entity::Entity::find()
            .filter(entity::Column::ProfileId.eq(profile_id))
            .filter(entity::Column::Channel.eq(Channel::InApp))
            .order_by_desc(entity::Column::CreatedAt)
            .limit(page.capped_limit())
            .offset(page.offset)
            .all(self.base.db())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn unread_count(&self, profile_id: Uuid) -> NotificationResult<u64> {
        let count = entity::Entity::find()
            .filter(entity::Column::ProfileId.eq(profile_id))
            .filter(entity::Column::Channel.eq(Channel::InApp))
            .filter(entity::Column::ReadAt.is_null())
            .count(self.base.db())
            .await?;

        Ok(count)
    }

    async fn mark_read(&self, id: Uuid, profile_id: Uuid) -> NotificationResult<bool> {
        // Scoped to the caller's own in-app entries only.
        let Some(model) = entity::Entity::find()
            .filter(entity::Column::Id.eq(id))
            .filter(entity::Column::ProfileId.eq(profile_id))
            .filter(entity::Column::Channel.eq(Channel::InApp))
            .one(self.base.db())
            .await?
        else {
            return Ok(false);
        };

        if model.read_at.is_some() {
            return Ok(true);
        }

        let mut active = model.into_active_model();
        active.read_at = Set(Some(Utc::now().into()));
        active.status = Set(NotificationStatus::Read);
        self.base.update(active).await?;
        Ok(true)
    }

    async fn mark_all_read(&self, profile_id: Uuid) -> NotificationResult<u64> {
        let result = entity::Entity::update_many()
            .col_expr(entity::Column::ReadAt, Expr::value(Utc::now()))
            .col_expr(
                entity::Column::Status,
                Expr::value(NotificationStatus::Read),
            )
            .filter(entity::Column::ProfileId.eq(profile_id))
            .filter(entity::Column::Channel.eq(Channel::InApp))
            .filter(entity::Column::ReadAt.is_null())
            .exec(self.base.db())
            .await?;

        Ok(result.rows_affected)
    }
}
