//! Audience preview for the broadcast composer.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use domain_engagement::{AudienceCounts, AudienceTarget};
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/preview", post(preview))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
struct PreviewRequest {
    targets: Vec<AudienceTarget>,
}

/// Count who a broadcast to these targets would reach, without sending.
#[utoipa::path(
    post,
    path = "/audience/preview",
    responses(
        (status = 200, description = "Deduplicated recipient counts"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not leadership")
    )
)]
#[instrument(skip_all)]
pub(crate) async fn preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<AudienceCounts>, ApiError> {
    let session = state.require_session(&headers).await?;
    session.require_leadership()?;

    let counts = state
        .audience
        .count(session.church_id, &request.targets)
        .await?;
    Ok(Json(counts))
}
