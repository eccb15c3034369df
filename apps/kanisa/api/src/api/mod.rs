//! HTTP API routes.

pub mod audience;
pub mod health;
pub mod notifications;
pub mod triggers;
pub mod webhook;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .nest("/triggers", triggers::router())
        .nest("/webhooks/whatsapp", webhook::router())
        .nest("/audience", audience::router())
        .nest("/notifications", notifications::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    axum::Json(crate::openapi::ApiDoc::openapi())
}
