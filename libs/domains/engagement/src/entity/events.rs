use sea_orm::entity::prelude::*;

use crate::models::{Event, EventStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub church_id: Uuid,
    pub title: String,
    pub starts_at: DateTimeWithTimeZone,
    pub status: EventStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Event {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            church_id: model.church_id,
            title: model.title,
            starts_at: model.starts_at.into(),
            status: model.status,
        }
    }
}
