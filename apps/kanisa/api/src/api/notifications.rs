//! In-app feed, read receipts and leadership broadcast.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use domain_engagement::AudienceTarget;
use domain_notifications::{
    LocalizedText, NotificationLog, NotificationType, Pagination, SendNotification,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed))
        .route("/{id}/read", post(mark_read))
        .route("/read-all", post(mark_all_read))
        .route("/broadcast", post(broadcast))
}

#[derive(Debug, Serialize)]
struct FeedResponse {
    notifications: Vec<NotificationLog>,
    unread_count: u64,
}

/// The caller's own in-app feed, newest first.
#[utoipa::path(
    get,
    path = "/notifications",
    responses(
        (status = 200, description = "Feed page with unread count"),
        (status = 401, description = "Not authenticated")
    )
)]
#[instrument(skip_all)]
pub(crate) async fn feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(page): Query<Pagination>,
) -> Result<Json<FeedResponse>, ApiError> {
    let session = state.require_session(&headers).await?;

    let notifications = state.ledger.list_in_app(session.profile_id, page).await?;
    let unread_count = state.ledger.unread_count(session.profile_id).await?;

    Ok(Json(FeedResponse {
        notifications,
        unread_count,
    }))
}

/// Mark one of the caller's own entries read.
#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    responses(
        (status = 200, description = "Entry marked read"),
        (status = 404, description = "No such entry for this caller")
    )
)]
#[instrument(skip(state, headers))]
pub(crate) async fn mark_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let session = state.require_session(&headers).await?;

    if state.ledger.mark_read(id, session.profile_id).await? {
        Ok(Json(json!({ "read": true })))
    } else {
        Err(ApiError::NotFound("Notification not found".to_string()))
    }
}

/// Mark all of the caller's unread entries read.
#[utoipa::path(
    post,
    path = "/notifications/read-all",
    responses((status = 200, description = "Number of entries touched"))
)]
#[instrument(skip_all)]
pub(crate) async fn mark_all_read(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = state.require_session(&headers).await?;
    let updated = state.ledger.mark_all_read(session.profile_id).await?;
    Ok(Json(json!({ "updated": updated })))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
struct BroadcastRequest {
    title_ar: String,
    title_en: Option<String>,
    body_ar: String,
    body_en: Option<String>,
    targets: Vec<AudienceTarget>,
}

/// Leadership broadcast to a resolved audience. Arabic content is
/// required; English falls back to the Arabic text when absent.
#[utoipa::path(
    post,
    path = "/notifications/broadcast",
    responses(
        (status = 200, description = "Dispatch summary {sent, targets}"),
        (status = 400, description = "Missing Arabic content or empty audience"),
        (status = 403, description = "Caller is not leadership")
    )
)]
#[instrument(skip_all)]
pub(crate) async fn broadcast(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BroadcastRequest>,
) -> Result<Json<Value>, ApiError> {
    let session = state.require_session(&headers).await?;
    session.require_leadership()?;

    if request.title_ar.trim().is_empty() || request.body_ar.trim().is_empty() {
        return Err(ApiError::Validation(
            "Arabic title and body are required".to_string(),
        ));
    }

    let audience = state
        .audience
        .resolve(session.church_id, &request.targets)
        .await?;
    if audience.is_empty() {
        return Err(ApiError::Validation(
            "Audience resolved to no recipients".to_string(),
        ));
    }

    let title = LocalizedText::new(
        request.title_en.unwrap_or_else(|| request.title_ar.clone()),
        request.title_ar,
    );
    let body = LocalizedText::new(
        request.body_en.unwrap_or_else(|| request.body_ar.clone()),
        request.body_ar,
    );

    let total = audience.total();
    let mut batch = Vec::with_capacity(total);
    for profile_id in audience.profile_ids {
        batch.push(SendNotification::to_profile(
            profile_id,
            session.church_id,
            NotificationType::General,
            title.clone(),
            body.clone(),
        ));
    }
    for visitor in audience.visitors {
        batch.push(SendNotification::to_visitor_phone(
            visitor.phone,
            session.church_id,
            NotificationType::General,
            title.clone(),
            body.clone(),
        ));
    }

    let outcome = state.notifier.send_batch(batch).await;
    Ok(Json(json!({ "sent": outcome.sent, "targets": total })))
}
