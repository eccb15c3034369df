//! Delivery-status ingestion from provider callbacks.
//!
//! Providers report message status transitions by external message id.
//! Updates for ids the ledger has never seen (or statuses outside the
//! lifecycle) are skipped, never an error: the provider retries callbacks
//! and an error response would only make it retry harder.

use tracing::{debug, instrument};

use crate::error::NotificationResult;
use crate::models::NotificationStatus;
use crate::repository::NotificationLogRepository;

/// One status transition reported by a provider callback.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    /// Provider-assigned message id.
    pub external_id: String,
    /// Raw provider status string ("sent", "delivered", "read", "failed").
    pub status: String,
}

/// Apply a callback's status updates to the ledger. Returns the number
/// of entries actually updated.
#[instrument(skip_all, fields(updates = updates.len()))]
pub async fn ingest_status_updates(
    ledger: &dyn NotificationLogRepository,
    updates: &[StatusUpdate],
) -> NotificationResult<usize> {
    let mut matched = 0;

    for update in updates {
        let Some(status) = NotificationStatus::from_provider(&update.status) else {
            debug!(
                external_id = %update.external_id,
                status = %update.status,
                "Ignoring unrecognized provider status"
            );
            continue;
        };

        if ledger
            .update_status_by_external_id(&update.external_id, status)
            .await?
        {
            matched += 1;
        } else {
            debug!(
                external_id = %update.external_id,
                "Callback for unknown message id, skipping"
            );
        }
    }

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockNotificationLogRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_known_id_updates_entry() {
        let mut ledger = MockNotificationLogRepository::new();
        ledger
            .expect_update_status_by_external_id()
            .with(eq("wamid.abc"), eq(NotificationStatus::Delivered))
            .times(1)
            .returning(|_, _| Ok(true));

        let updates = vec![StatusUpdate {
            external_id: "wamid.abc".to_string(),
            status: "delivered".to_string(),
        }];

        let matched = ingest_status_updates(&ledger, &updates).await.unwrap();
        assert_eq!(matched, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_skipped() {
        let mut ledger = MockNotificationLogRepository::new();
        ledger
            .expect_update_status_by_external_id()
            .times(1)
            .returning(|_, _| Ok(false));

        let updates = vec![StatusUpdate {
            external_id: "wamid.unknown".to_string(),
            status: "read".to_string(),
        }];

        let matched = ingest_status_updates(&ledger, &updates).await.unwrap();
        assert_eq!(matched, 0);
    }

    #[tokio::test]
    async fn test_unrecognized_status_never_touches_ledger() {
        let mut ledger = MockNotificationLogRepository::new();
        ledger.expect_update_status_by_external_id().never();

        let updates = vec![StatusUpdate {
            external_id: "wamid.abc".to_string(),
            status: "warming_up".to_string(),
        }];

        let matched = ingest_status_updates(&ledger, &updates).await.unwrap();
        assert_eq!(matched, 0);
    }
}
