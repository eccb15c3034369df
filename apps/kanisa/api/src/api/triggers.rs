//! Trigger job endpoints, invoked by an external periodic caller with a
//! bearer shared secret.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use domain_engagement::{AtRiskSummary, EscalationSummary};
use domain_notifications::BatchOutcome;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/event-reminders", post(event_reminders))
        .route("/gathering-reminders", post(gathering_reminders))
        .route("/visitor-sla", post(visitor_sla))
        .route("/at-risk", post(at_risk))
}

#[utoipa::path(
    post,
    path = "/triggers/event-reminders",
    responses(
        (status = 200, description = "Scan summary {sent, total}"),
        (status = 401, description = "Missing or wrong shared secret")
    )
)]
#[instrument(skip_all)]
pub(crate) async fn event_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BatchOutcome>, ApiError> {
    state.require_trigger_secret(&headers)?;
    Ok(Json(state.triggers.run_event_reminders().await?))
}

#[utoipa::path(
    post,
    path = "/triggers/gathering-reminders",
    responses(
        (status = 200, description = "Scan summary {sent, total}"),
        (status = 401, description = "Missing or wrong shared secret")
    )
)]
#[instrument(skip_all)]
pub(crate) async fn gathering_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BatchOutcome>, ApiError> {
    state.require_trigger_secret(&headers)?;
    Ok(Json(state.triggers.run_gathering_reminders().await?))
}

#[utoipa::path(
    post,
    path = "/triggers/visitor-sla",
    responses(
        (status = 200, description = "Scan summary {escalated}"),
        (status = 401, description = "Missing or wrong shared secret")
    )
)]
#[instrument(skip_all)]
pub(crate) async fn visitor_sla(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<EscalationSummary>, ApiError> {
    state.require_trigger_secret(&headers)?;
    Ok(Json(state.triggers.run_visitor_sla_scan().await?))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
struct AtRiskRequest {
    gathering_id: Uuid,
}

/// Invoked by the attendance collaborator when a gathering completes.
#[utoipa::path(
    post,
    path = "/triggers/at-risk",
    responses(
        (status = 200, description = "Pass summary {flagged}"),
        (status = 401, description = "Missing or wrong shared secret"),
        (status = 404, description = "Unknown gathering")
    )
)]
#[instrument(skip(state, headers))]
pub(crate) async fn at_risk(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AtRiskRequest>,
) -> Result<Json<AtRiskSummary>, ApiError> {
    state.require_trigger_secret(&headers)?;
    Ok(Json(
        state.absence.check_and_flag_at_risk(request.gathering_id).await?,
    ))
}
