use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// Liveness probe with a database round trip.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are up"),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    database::postgres::check_health(&state.db)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(json!({ "status": "ok" })))
}
