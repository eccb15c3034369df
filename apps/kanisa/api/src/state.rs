use std::sync::Arc;

use axum::http::HeaderMap;
use database::postgres::DatabaseConnection;
use domain_engagement::{AbsenceEngine, AudienceResolver, TriggerJobs};
use domain_notifications::{NotificationLogRepository, Notifier};

use crate::auth::{bearer_token, Session, SessionResolver};
use crate::config::Config;
use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub sessions: Arc<dyn SessionResolver>,
    pub audience: Arc<AudienceResolver>,
    pub notifier: Arc<dyn Notifier>,
    pub ledger: Arc<dyn NotificationLogRepository>,
    pub triggers: Arc<TriggerJobs>,
    pub absence: Arc<AbsenceEngine>,
}

impl AppState {
    /// Resolve the caller's session or fail with 401.
    pub async fn require_session(&self, headers: &HeaderMap) -> Result<Session, ApiError> {
        let token = bearer_token(headers).ok_or(ApiError::Authentication)?;
        self.sessions
            .resolve(token)
            .await?
            .ok_or(ApiError::Authentication)
    }

    /// Check the shared secret the external periodic invoker presents
    /// to the trigger endpoints.
    pub fn require_trigger_secret(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        match bearer_token(headers) {
            Some(token) if token == self.config.trigger_secret => Ok(()),
            _ => Err(ApiError::Authentication),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::http::header::AUTHORIZATION;
    use axum::http::HeaderValue;

    #[test]
    fn test_trigger_secret_missing_or_wrong_is_401() {
        let state = test_state();

        assert!(matches!(
            state.require_trigger_secret(&HeaderMap::new()),
            Err(ApiError::Authentication)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer wrong"));
        assert!(matches!(
            state.require_trigger_secret(&headers),
            Err(ApiError::Authentication)
        ));
    }

    #[test]
    fn test_trigger_secret_match_passes() {
        let state = test_state();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer trigger-secret"),
        );
        assert!(state.require_trigger_secret(&headers).is_ok());
    }

    #[tokio::test]
    async fn test_missing_bearer_token_is_401() {
        let state = test_state();

        let result = state.require_session(&HeaderMap::new()).await;
        assert!(matches!(result, Err(ApiError::Authentication)));
    }
}
