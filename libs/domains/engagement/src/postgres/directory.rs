use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use uuid::Uuid;

use crate::entity::{churches, group_members, groups, ministry_members, profiles, visitors};
use crate::error::EngagementResult;
use crate::models::{
    ChurchSettings, EngagementStatus, Group, MemberRole, Profile, VisitorContact, VisitorStatus,
};
use crate::repository::DirectoryRepository;

/// Visitor statuses still awaiting follow-up.
const OPEN_VISITOR_STATUSES: [VisitorStatus; 3] = [
    VisitorStatus::New,
    VisitorStatus::Assigned,
    VisitorStatus::Contacted,
];

pub struct PgDirectoryRepository {
    db: DatabaseConnection,
}

impl PgDirectoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Of the given profile ids, keep those belonging to active members.
    async fn active_subset(&self, profile_ids: Vec<Uuid>) -> EngagementResult<Vec<Uuid>> {
        if profile_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = profiles::Entity::find()
            .select_only()
            .column(profiles::Column::Id)
            .filter(profiles::Column::Id.is_in(profile_ids))
            .filter(profiles::Column::IsActive.eq(true))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }

    async fn member_ids_of_group(&self, group_id: Uuid) -> EngagementResult<Vec<Uuid>> {
        let ids = group_members::Entity::find()
            .select_only()
            .column(group_members::Column::ProfileId)
            .filter(group_members::Column::GroupId.eq(group_id))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }

    async fn member_ids_of_ministry(&self, ministry_id: Uuid) -> EngagementResult<Vec<Uuid>> {
        let ids = ministry_members::Entity::find()
            .select_only()
            .column(ministry_members::Column::ProfileId)
            .filter(ministry_members::Column::MinistryId.eq(ministry_id))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }
}

#[async_trait]
impl DirectoryRepository for PgDirectoryRepository {
    async fn active_profile_ids(&self, church_id: Uuid) -> EngagementResult<Vec<Uuid>> {
        let ids = profiles::Entity::find()
            .select_only()
            .column(profiles::Column::Id)
            .filter(profiles::Column::ChurchId.eq(church_id))
            .filter(profiles::Column::IsActive.eq(true))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }

    async fn profile_ids_by_role(
        &self,
        church_id: Uuid,
        role: MemberRole,
    ) -> EngagementResult<Vec<Uuid>> {
        let ids = profiles::Entity::find()
            .select_only()
            .column(profiles::Column::Id)
            .filter(profiles::Column::ChurchId.eq(church_id))
            .filter(profiles::Column::IsActive.eq(true))
            .filter(profiles::Column::Role.eq(role))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }

    async fn group_member_ids(&self, group_id: Uuid) -> EngagementResult<Vec<Uuid>> {
        let members = self.member_ids_of_group(group_id).await?;
        self.active_subset(members).await
    }

    async fn ministry_member_ids(&self, ministry_id: Uuid) -> EngagementResult<Vec<Uuid>> {
        let members = self.member_ids_of_ministry(ministry_id).await?;
        self.active_subset(members).await
    }

    async fn open_visitors(&self, church_id: Uuid) -> EngagementResult<Vec<VisitorContact>> {
        let rows: Vec<(Uuid, String)> = visitors::Entity::find()
            .select_only()
            .column(visitors::Column::Id)
            .column(visitors::Column::Phone)
            .filter(visitors::Column::ChurchId.eq(church_id))
            .filter(visitors::Column::Status.is_in(OPEN_VISITOR_STATUSES))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, phone)| VisitorContact { id, phone })
            .collect())
    }

    async fn count_active_profiles(&self, church_id: Uuid) -> EngagementResult<u64> {
        let count = profiles::Entity::find()
            .filter(profiles::Column::ChurchId.eq(church_id))
            .filter(profiles::Column::IsActive.eq(true))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn count_profiles_by_role(
        &self,
        church_id: Uuid,
        role: MemberRole,
    ) -> EngagementResult<u64> {
        let count = profiles::Entity::find()
            .filter(profiles::Column::ChurchId.eq(church_id))
            .filter(profiles::Column::IsActive.eq(true))
            .filter(profiles::Column::Role.eq(role))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn count_group_members(&self, group_id: Uuid) -> EngagementResult<u64> {
        let members = self.member_ids_of_group(group_id).await?;
        if members.is_empty() {
            return Ok(0);
        }
        let count = profiles::Entity::find()
            .filter(profiles::Column::Id.is_in(members))
            .filter(profiles::Column::IsActive.eq(true))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn count_ministry_members(&self, ministry_id: Uuid) -> EngagementResult<u64> {
        let members = self.member_ids_of_ministry(ministry_id).await?;
        if members.is_empty() {
            return Ok(0);
        }
        let count = profiles::Entity::find()
            .filter(profiles::Column::Id.is_in(members))
            .filter(profiles::Column::IsActive.eq(true))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn count_open_visitors(&self, church_id: Uuid) -> EngagementResult<u64> {
        let count = visitors::Entity::find()
            .filter(visitors::Column::ChurchId.eq(church_id))
            .filter(visitors::Column::Status.is_in(OPEN_VISITOR_STATUSES))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn leadership_profile_ids(&self, church_id: Uuid) -> EngagementResult<Vec<Uuid>> {
        let ids = profiles::Entity::find()
            .select_only()
            .column(profiles::Column::Id)
            .filter(profiles::Column::ChurchId.eq(church_id))
            .filter(profiles::Column::IsActive.eq(true))
            .filter(profiles::Column::Role.is_in([MemberRole::Pastor, MemberRole::Leader]))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }

    async fn profile(&self, profile_id: Uuid) -> EngagementResult<Option<Profile>> {
        let model = profiles::Entity::find_by_id(profile_id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn group(&self, group_id: Uuid) -> EngagementResult<Option<Group>> {
        let model = groups::Entity::find_by_id(group_id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn church_settings(&self, church_id: Uuid) -> EngagementResult<Option<ChurchSettings>> {
        let model = churches::Entity::find_by_id(church_id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn churches(&self) -> EngagementResult<Vec<ChurchSettings>> {
        let models = churches::Entity::find().all(&self.db).await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn flag_at_risk(&self, profile_id: Uuid) -> EngagementResult<bool> {
        // Conditional write: only an `active` row may become `at_risk`,
        // and a raced second run must see zero rows affected.
        let result = profiles::Entity::update_many()
            .col_expr(
                profiles::Column::EngagementStatus,
                Expr::value(EngagementStatus::AtRisk),
            )
            .filter(profiles::Column::Id.eq(profile_id))
            .filter(profiles::Column::EngagementStatus.eq(EngagementStatus::Active))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
