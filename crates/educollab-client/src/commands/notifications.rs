use serde_json::json;
use tracing::{info, warn};

use educollab_shared::EntityId;
use educollab_store::{Filter, Notification};

use crate::error::{ClientError, Result};
use crate::invalidation::Mutation;
use crate::keys::QueryKey;
use crate::state::Platform;

impl Platform {
    /// The signed-in user's notifications, newest first.
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        let user = self.session.require_user()?;
        self.cache
            .fetch_as(&QueryKey::Notifications(user.id))
            .await
    }

    pub async fn unread_count(&self) -> Result<usize> {
        Ok(self.notifications().await?.iter().filter(|n| !n.is_read).count())
    }

    pub async fn mark_notification_read(&self, id: &EntityId) -> Result<Notification> {
        self.set_notification_read(id, true).await
    }

    /// Toggle one notification's read flag.
    pub async fn set_notification_read(&self, id: &EntityId, read: bool) -> Result<Notification> {
        let user = self.session.require_user()?;
        let current: Notification = self.resources.get(id).await?;
        if current.user_id != user.id {
            return Err(ClientError::Unauthorized(
                "notification belongs to another user".into(),
            ));
        }

        let updated = self
            .resources
            .update(id, json!({ "isRead": read }))
            .await?;
        self.confirm(Mutation::ReadNotifications { user_id: user.id }).await;
        Ok(updated)
    }

    /// Mark every unread notification of the signed-in user as read.
    /// Returns how many were updated.
    ///
    /// Writes are independent. When one fails, those already written are
    /// still invalidated before the error is returned.
    pub async fn mark_all_notifications_read(&self) -> Result<usize> {
        let user = self.session.require_user()?;
        let unread: Vec<Notification> = self
            .resources
            .list(&Filter::all().eq("userId", &user.id).eq("isRead", false))
            .await?;

        let mut marked = 0;
        let mut failure = None;
        for notification in &unread {
            match self
                .resources
                .update::<Notification>(&notification.id, json!({ "isRead": true }))
                .await
            {
                Ok(_) => marked += 1,
                Err(e) => {
                    warn!(notification = %notification.id, error = %e, "mark read failed");
                    failure = Some(e);
                    break;
                }
            }
        }

        if marked > 0 {
            self.confirm(Mutation::ReadNotifications {
                user_id: user.id.clone(),
            })
            .await;
        }
        if let Some(e) = failure {
            return Err(e.into());
        }
        info!(user = %user.id, marked, "notifications marked read");
        Ok(marked)
    }
}
