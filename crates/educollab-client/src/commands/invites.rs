use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use educollab_shared::invite::normalize_email;
use educollab_shared::{EntityId, InviteStatus, MemberRole, ValidationError};
use educollab_store::{Filter, TeamInvite, User};

use crate::error::{ClientError, Result};
use crate::fanout::Notified;
use crate::invalidation::Mutation;
use crate::keys::QueryKey;
use crate::state::Platform;

impl Platform {
    /// Invites addressed to the signed-in user, any status.
    pub async fn my_invites(&self) -> Result<Vec<TeamInvite>> {
        let user = self.session.require_user()?;
        self.cache
            .fetch_as(&QueryKey::TeamInvites(normalize_email(&user.email)))
            .await
    }

    /// The signed-in user's pending invite to `project_id`, if any.
    ///
    /// Guests have none.
    pub async fn pending_invite_for(&self, project_id: &EntityId) -> Result<Option<TeamInvite>> {
        if !self.session.is_signed_in() {
            return Ok(None);
        }
        Ok(self
            .my_invites()
            .await?
            .into_iter()
            .find(|i| &i.project_id == project_id && i.status == InviteStatus::Pending))
    }

    /// Invite `email` to `project_id`. Owner only, while the project is
    /// looking for members.
    pub async fn create_invite(
        &self,
        project_id: &EntityId,
        email: &str,
    ) -> Result<Notified<TeamInvite>> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ValidationError::EmptyField("inviteeEmail").into());
        }
        let inviter = self.session.require_user()?;
        let summary = self.require_owner(project_id).await?;
        if !summary.project.looking_for_members {
            return Err(ClientError::Unauthorized(
                "project is not looking for members".into(),
            ));
        }

        let outstanding = self
            .resources
            .find_one::<TeamInvite>(
                &Filter::all()
                    .eq("projectId", project_id)
                    .eq("inviteeEmail", email.as_str())
                    .eq("status", InviteStatus::Pending.as_str()),
            )
            .await?;
        if outstanding.is_some() {
            return Err(ClientError::Conflict(format!(
                "{email} already has a pending invite to this project"
            )));
        }

        let invite = TeamInvite {
            id: EntityId::new(),
            project_id: project_id.clone(),
            invitee_email: email.clone(),
            inviter_id: inviter.id.clone(),
            status: InviteStatus::Pending,
            created_at: Utc::now(),
        };
        let invite = self.resources.create(&invite).await?;
        info!(project = %project_id, invitee = %email, "invite created");

        self.confirm(Mutation::CreateInvite {
            invitee_email: email,
        })
        .await;

        let fanout = self.fanout.invite_created(&invite, &summary.project).await;
        self.deliver(&fanout).await;
        Ok(Notified {
            value: invite,
            fanout,
        })
    }

    /// Join the invite's project, then mark the invite accepted.
    pub async fn accept_invite(&self, invite_id: &EntityId) -> Result<TeamInvite> {
        let (user, invite) = self.own_invite(invite_id).await?;
        invite.status.transition(InviteStatus::Accepted)?;

        match self
            .join(&user, &invite.project_id, MemberRole::Member, true)
            .await
        {
            Ok(_) => {}
            // Already on the team: the invite is still settled.
            Err(ClientError::Conflict(msg)) => {
                warn!(invite = %invite_id, reason = %msg, "accepting invite for existing member");
            }
            Err(e) => return Err(e),
        }

        self.respond(&invite, InviteStatus::Accepted).await
    }

    pub async fn decline_invite(&self, invite_id: &EntityId) -> Result<TeamInvite> {
        let (_, invite) = self.own_invite(invite_id).await?;
        invite.status.transition(InviteStatus::Rejected)?;
        self.respond(&invite, InviteStatus::Rejected).await
    }

    async fn own_invite(
        &self,
        invite_id: &EntityId,
    ) -> Result<(User, TeamInvite)> {
        let user = self.session.require_user()?;
        let invite: TeamInvite = self.resources.get(invite_id).await?;
        if normalize_email(&invite.invitee_email) != normalize_email(&user.email) {
            return Err(ClientError::Unauthorized(
                "invite is addressed to someone else".into(),
            ));
        }
        Ok((user, invite))
    }

    async fn respond(&self, invite: &TeamInvite, status: InviteStatus) -> Result<TeamInvite> {
        let updated: TeamInvite = self
            .resources
            .update(&invite.id, json!({ "status": status }))
            .await?;
        info!(invite = %invite.id, status = %status, "invite answered");
        self.confirm(Mutation::RespondToInvite {
            invitee_email: normalize_email(&invite.invitee_email),
        })
        .await;
        Ok(updated)
    }
}
