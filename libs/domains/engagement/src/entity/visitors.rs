use sea_orm::entity::prelude::*;

use crate::models::{Visitor, VisitorStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "visitors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub church_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub status: VisitorStatus,
    pub visited_at: DateTimeWithTimeZone,
    pub escalated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Visitor {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            church_id: model.church_id,
            full_name: model.full_name,
            phone: model.phone,
            status: model.status,
            visited_at: model.visited_at.into(),
            escalated_at: model.escalated_at.map(Into::into),
        }
    }
}
