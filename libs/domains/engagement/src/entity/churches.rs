use domain_notifications::Locale;
use sea_orm::entity::prelude::*;

use crate::models::ChurchSettings;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "churches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Locale tag such as "ar" or "en"; unparseable values fall back
    /// to the platform default.
    pub default_locale: String,
    pub visitor_sla_hours: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ChurchSettings {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            default_locale: Locale::from_tag(&model.default_locale).unwrap_or_default(),
            visitor_sla_hours: model.visitor_sla_hours,
        }
    }
}
