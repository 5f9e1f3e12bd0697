//! Notification fan-out.
//!
//! Notifications are written as a side effect of another mutation. The
//! primary write has already succeeded by the time fan-out runs, so every
//! failure here is logged and reported through [`FanoutOutcome`], never as
//! an error.

use chrono::Utc;
use tracing::{debug, warn};

use educollab_shared::invite::normalize_email;
use educollab_shared::{EntityId, NotificationKind};
use educollab_store::{Filter, Notification, Project, ResourceClient, TeamInvite, User};

/// Result of one best-effort notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanoutOutcome {
    Delivered(Notification),
    /// Nobody to notify, e.g. an invite to an unregistered email.
    Skipped,
    Failed(String),
}

impl FanoutOutcome {
    pub fn delivered(&self) -> Option<&Notification> {
        match self {
            FanoutOutcome::Delivered(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Fanout {
    resources: ResourceClient,
}

impl Fanout {
    pub fn new(resources: ResourceClient) -> Self {
        Self { resources }
    }

    /// Tell the invitee about a new invite, if they have an account.
    pub async fn invite_created(&self, invite: &TeamInvite, project: &Project) -> FanoutOutcome {
        let email = normalize_email(&invite.invitee_email);
        let invitee = match self
            .resources
            .find_one::<User>(&Filter::all().eq("email", email.as_str()))
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(email = %email, "invitee has no account, skipping notification");
                return FanoutOutcome::Skipped;
            }
            Err(e) => {
                warn!(email = %email, error = %e, "invitee lookup failed");
                return FanoutOutcome::Failed(e.to_string());
            }
        };

        self.send(
            &invitee.id,
            NotificationKind::Invite,
            "New team invite",
            format!("You have been invited to join \"{}\"", project.title),
            Some(&invite.id),
        )
        .await
    }

    /// Tell the project owner that someone joined.
    pub async fn member_joined(&self, project: &Project, member: &User) -> FanoutOutcome {
        if project.owner_id == member.id {
            return FanoutOutcome::Skipped;
        }
        self.send(
            &project.owner_id,
            NotificationKind::System,
            "New team member",
            format!("{} joined \"{}\"", member.name, project.title),
            Some(&project.id),
        )
        .await
    }

    pub async fn send(
        &self,
        user_id: &EntityId,
        kind: NotificationKind,
        title: &str,
        message: String,
        related_id: Option<&EntityId>,
    ) -> FanoutOutcome {
        let notification = Notification {
            id: EntityId::new(),
            user_id: user_id.clone(),
            kind,
            title: title.to_string(),
            message,
            related_id: related_id.cloned(),
            is_read: false,
            created_at: Utc::now(),
        };

        match self.resources.create(&notification).await {
            Ok(created) => {
                debug!(user = %user_id, kind = %kind, "notification delivered");
                FanoutOutcome::Delivered(created)
            }
            Err(e) => {
                warn!(user = %user_id, kind = %kind, error = %e, "notification fan-out failed");
                FanoutOutcome::Failed(e.to_string())
            }
        }
    }
}

/// A primary write plus the outcome of the notification it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notified<T> {
    pub value: T,
    pub fanout: FanoutOutcome,
}
