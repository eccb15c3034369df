use sea_orm::entity::prelude::*;

use crate::models::{Gathering, GatheringStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "gatherings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub church_id: Uuid,
    pub starts_at: DateTimeWithTimeZone,
    pub status: GatheringStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Gathering {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            church_id: model.church_id,
            starts_at: model.starts_at.into(),
            status: model.status,
        }
    }
}
