//! Session resolution and role checks.
//!
//! Identity is an external collaborator: this app only consumes a
//! resolved session (profile, church, role) through the
//! `SessionResolver` trait.

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use domain_engagement::MemberRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// A resolved caller identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub profile_id: Uuid,
    pub church_id: Uuid,
    pub role: MemberRole,
}

impl Session {
    pub fn require_leadership(&self) -> Result<(), ApiError> {
        if self.role.is_leadership() {
            Ok(())
        } else {
            Err(ApiError::Authorization)
        }
    }
}

/// Resolves a bearer token into a session, or None when the token is
/// invalid or expired.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<Session>, ApiError>;
}

/// Resolver backed by the identity service over HTTP.
pub struct HttpSessionResolver {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSessionResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SessionResolver for HttpSessionResolver {
    async fn resolve(&self, token: &str) -> Result<Option<Session>, ApiError> {
        let response = self
            .client
            .get(format!("{}/sessions/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("Identity service unreachable: {}", e)))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ApiError::Internal(format!(
                "Identity service returned {}",
                response.status()
            )));
        }

        let session = response
            .json::<Session>()
            .await
            .map_err(|e| ApiError::Internal(format!("Malformed session payload: {}", e)))?;
        Ok(Some(session))
    }
}

/// Extract the bearer token from an Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_leadership_check() {
        let session = Session {
            profile_id: Uuid::now_v7(),
            church_id: Uuid::now_v7(),
            role: MemberRole::Member,
        };
        assert!(matches!(
            session.require_leadership(),
            Err(ApiError::Authorization)
        ));

        let session = Session {
            role: MemberRole::Pastor,
            ..session
        };
        assert!(session.require_leadership().is_ok());
    }
}
