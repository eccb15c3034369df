use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::visitors;
use crate::error::EngagementResult;
use crate::models::{Visitor, VisitorStatus};
use crate::repository::VisitorsRepository;

pub struct PgVisitorsRepository {
    db: DatabaseConnection,
}

impl PgVisitorsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VisitorsRepository for PgVisitorsRepository {
    async fn overdue(
        &self,
        church_id: Uuid,
        deadline: DateTime<Utc>,
    ) -> EngagementResult<Vec<Visitor>> {
        let models = visitors::Entity::find()
            .filter(visitors::Column::ChurchId.eq(church_id))
            .filter(visitors::Column::Status.is_in([VisitorStatus::New, VisitorStatus::Assigned]))
            .filter(visitors::Column::EscalatedAt.is_null())
            .filter(visitors::Column::VisitedAt.lt(deadline))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn mark_escalated(&self, visitor_id: Uuid) -> EngagementResult<bool> {
        // Guarded write: once escalated_at is set it never changes, and
        // concurrent scans must see zero rows affected.
        let result = visitors::Entity::update_many()
            .col_expr(visitors::Column::EscalatedAt, Expr::value(Utc::now()))
            .filter(visitors::Column::Id.eq(visitor_id))
            .filter(visitors::Column::EscalatedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
