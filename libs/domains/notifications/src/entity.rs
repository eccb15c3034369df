use crate::models::{
    Channel, CreateNotificationLog, NotificationLog, NotificationStatus, NotificationType,
};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

/// Sea-ORM entity for the notification ledger.
///
/// Rows are append-mostly: created by the dispatcher, status-mutated by
/// the webhook ingestor or the recipient marking them read, never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub profile_id: Option<Uuid>,
    pub church_id: Uuid,
    pub channel: Channel,
    pub notification_type: NotificationType,
    pub title_en: String,
    pub title_ar: String,
    #[sea_orm(column_type = "Text")]
    pub body_en: String,
    #[sea_orm(column_type = "Text")]
    pub body_ar: String,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    #[sea_orm(indexed)]
    pub external_message_id: Option<String>,
    pub status: NotificationStatus,
    pub error_message: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub read_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for NotificationLog {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            profile_id: model.profile_id,
            church_id: model.church_id,
            channel: model.channel,
            notification_type: model.notification_type,
            title_en: model.title_en,
            title_ar: model.title_ar,
            body_en: model.body_en,
            body_ar: model.body_ar,
            reference_id: model.reference_id,
            reference_type: model.reference_type,
            external_message_id: model.external_message_id,
            status: model.status,
            error_message: model.error_message,
            created_at: model.created_at.into(),
            read_at: model.read_at.map(Into::into),
        }
    }
}

impl From<CreateNotificationLog> for ActiveModel {
    fn from(input: CreateNotificationLog) -> Self {
        ActiveModel {
            id: Set(Uuid::now_v7()),
            profile_id: Set(input.profile_id),
            church_id: Set(input.church_id),
            channel: Set(input.channel),
            notification_type: Set(input.notification_type),
            title_en: Set(input.title_en),
            title_ar: Set(input.title_ar),
            body_en: Set(input.body_en),
            body_ar: Set(input.body_ar),
            reference_id: Set(input.reference_id),
            reference_type: Set(input.reference_type),
            external_message_id: Set(None),
            status: Set(input.status),
            error_message: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            read_at: Set(None),
        }
    }
}
