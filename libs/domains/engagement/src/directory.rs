//! Adapter exposing the membership directory to the notification
//! dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use domain_notifications::{
    Locale, NotificationError, NotificationResult, RecipientDirectory, RecipientProfile,
};
use uuid::Uuid;

use crate::error::EngagementError;
use crate::repository::DirectoryRepository;

pub struct EngagementRecipientDirectory {
    directory: Arc<dyn DirectoryRepository>,
}

impl EngagementRecipientDirectory {
    pub fn new(directory: Arc<dyn DirectoryRepository>) -> Self {
        Self { directory }
    }
}

fn to_notification_error(err: EngagementError) -> NotificationError {
    NotificationError::Internal(err.to_string())
}

#[async_trait]
impl RecipientDirectory for EngagementRecipientDirectory {
    async fn recipient_profile(
        &self,
        profile_id: Uuid,
    ) -> NotificationResult<Option<RecipientProfile>> {
        let profile = self
            .directory
            .profile(profile_id)
            .await
            .map_err(to_notification_error)?;

        Ok(profile.map(|profile| RecipientProfile {
            id: profile.id,
            full_name: profile.full_name,
            phone: profile.phone,
            email: profile.email,
            preferred_locale: profile.preferred_locale,
            preference: profile.notification_preference,
        }))
    }

    async fn church_default_locale(&self, church_id: Uuid) -> NotificationResult<Locale> {
        let settings = self
            .directory
            .church_settings(church_id)
            .await
            .map_err(to_notification_error)?;

        Ok(settings
            .map(|settings| settings.default_locale)
            .unwrap_or_default())
    }
}
