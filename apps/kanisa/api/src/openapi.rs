//! OpenAPI document, served at /api-docs/openapi.json.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kanisa Engagement API",
        description = "Audience resolution, notification dispatch and engagement trigger jobs"
    ),
    paths(
        crate::api::health::health,
        crate::api::audience::preview,
        crate::api::notifications::feed,
        crate::api::notifications::mark_read,
        crate::api::notifications::mark_all_read,
        crate::api::notifications::broadcast,
        crate::api::triggers::event_reminders,
        crate::api::triggers::gathering_reminders,
        crate::api::triggers::visitor_sla,
        crate::api::triggers::at_risk,
        crate::api::webhook::verify,
        crate::api::webhook::receive,
    )
)]
pub struct ApiDoc;
