//! WhatsApp Cloud API webhook: GET verification handshake plus POST
//! delivery-status callbacks.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use domain_notifications::webhook::{ingest_status_updates, StatusUpdate};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(verify).post(receive))
}

#[derive(Debug, Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// Subscription handshake: echo the challenge when the verify token
/// matches, 403 otherwise.
#[utoipa::path(
    get,
    path = "/webhooks/whatsapp",
    responses(
        (status = 200, description = "Challenge echoed back"),
        (status = 403, description = "Verify token mismatch")
    )
)]
#[instrument(skip_all)]
pub(crate) async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<String, ApiError> {
    let token_matches = params
        .verify_token
        .as_deref()
        .is_some_and(|t| t == state.config.webhook_verify_token);

    if params.mode.as_deref() == Some("subscribe") && token_matches {
        Ok(params.challenge.unwrap_or_default())
    } else {
        warn!("webhook verification rejected");
        Err(ApiError::Authorization)
    }
}

// Meta callback envelope, reduced to the status fields we consume.
// Everything defaults so unrelated callback shapes deserialize to
// empty vectors instead of erroring.
#[derive(Debug, Default, Deserialize)]
struct CallbackEnvelope {
    #[serde(default)]
    entry: Vec<CallbackEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct CallbackEntry {
    #[serde(default)]
    changes: Vec<CallbackChange>,
}

#[derive(Debug, Default, Deserialize)]
struct CallbackChange {
    #[serde(default)]
    value: CallbackValue,
}

#[derive(Debug, Default, Deserialize)]
struct CallbackValue {
    #[serde(default)]
    statuses: Vec<ProviderStatus>,
}

#[derive(Debug, Deserialize)]
struct ProviderStatus {
    id: String,
    status: String,
}

/// Delivery-status callbacks. Always acknowledged with 200 so the
/// provider does not retry; ingestion problems are logged instead.
#[utoipa::path(
    post,
    path = "/webhooks/whatsapp",
    responses((status = 200, description = "Callback acknowledged"))
)]
#[instrument(skip_all)]
pub(crate) async fn receive(State(state): State<AppState>, Json(payload): Json<Value>) -> Json<Value> {
    let envelope: CallbackEnvelope = match serde_json::from_value(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "unparseable webhook payload, acknowledging anyway");
            return Json(json!({ "received": true }));
        }
    };

    let updates: Vec<StatusUpdate> = envelope
        .entry
        .into_iter()
        .flat_map(|entry| entry.changes)
        .flat_map(|change| change.value.statuses)
        .map(|status| StatusUpdate {
            external_id: status.id,
            status: status.status,
        })
        .collect();

    if updates.is_empty() {
        debug!("webhook callback carried no status updates");
        return Json(json!({ "received": true }));
    }

    match ingest_status_updates(state.ledger.as_ref(), &updates).await {
        Ok(matched) => debug!(received = updates.len(), matched, "status updates ingested"),
        Err(e) => warn!(error = %e, "status update ingestion failed"),
    }

    Json(json!({ "received": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;

    fn params(mode: &str, token: &str, challenge: &str) -> VerifyParams {
        VerifyParams {
            mode: Some(mode.to_string()),
            verify_token: Some(token.to_string()),
            challenge: Some(challenge.to_string()),
        }
    }

    #[tokio::test]
    async fn test_verify_echoes_challenge_on_token_match() {
        let state = test_state();

        let echoed = verify(
            State(state),
            Query(params("subscribe", "verify-token", "1158201444")),
        )
        .await
        .unwrap();
        assert_eq!(echoed, "1158201444");
    }

    #[tokio::test]
    async fn test_verify_rejects_token_mismatch() {
        let state = test_state();

        let result = verify(
            State(state),
            Query(params("subscribe", "wrong-token", "1158201444")),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Authorization)));
    }

    #[tokio::test]
    async fn test_verify_rejects_non_subscribe_mode() {
        let state = test_state();

        let result = verify(
            State(state),
            Query(params("unsubscribe", "verify-token", "1158201444")),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Authorization)));
    }

    #[test]
    fn test_envelope_extracts_statuses() {
        let payload = json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "123",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "statuses": [
                            { "id": "wamid.A", "status": "delivered", "timestamp": "1" },
                            { "id": "wamid.B", "status": "read", "timestamp": "2" }
                        ]
                    }
                }]
            }]
        });

        let envelope: CallbackEnvelope = serde_json::from_value(payload).unwrap();
        let statuses: Vec<_> = envelope
            .entry
            .into_iter()
            .flat_map(|e| e.changes)
            .flat_map(|c| c.value.statuses)
            .collect();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].id, "wamid.A");
        assert_eq!(statuses[1].status, "read");
    }

    #[test]
    fn test_envelope_tolerates_message_callbacks() {
        // Inbound-message callbacks have no statuses array at all.
        let payload = json!({
            "entry": [{
                "changes": [{
                    "value": { "messages": [{ "from": "201234567890" }] }
                }]
            }]
        });

        let envelope: CallbackEnvelope = serde_json::from_value(payload).unwrap();
        assert!(envelope.entry[0].changes[0].value.statuses.is_empty());
    }

    #[test]
    fn test_verify_params_rename() {
        let params: VerifyParams = serde_json::from_value(json!({
            "hub.mode": "subscribe",
            "hub.verify_token": "secret",
            "hub.challenge": "1158201444",
        }))
        .unwrap();
        assert_eq!(params.mode.as_deref(), Some("subscribe"));
        assert_eq!(params.verify_token.as_deref(), Some("secret"));
        assert_eq!(params.challenge.as_deref(), Some("1158201444"));
    }
}
