use domain_notifications::Locale;
use sea_orm::entity::prelude::*;

use crate::models::{EngagementStatus, MemberRole, Profile};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub church_id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub preferred_locale: Option<String>,
    /// One of `whatsapp|sms|email|all|none`; unknown values fall back
    /// to the default preference.
    pub notification_preference: String,
    pub engagement_status: EngagementStatus,
    pub role: MemberRole,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Profile {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            church_id: model.church_id,
            full_name: model.full_name,
            phone: model.phone,
            email: model.email,
            preferred_locale: model
                .preferred_locale
                .as_deref()
                .and_then(Locale::from_tag),
            notification_preference: model
                .notification_preference
                .parse()
                .unwrap_or_default(),
            engagement_status: model.engagement_status,
            role: model.role,
            is_active: model.is_active,
        }
    }
}
