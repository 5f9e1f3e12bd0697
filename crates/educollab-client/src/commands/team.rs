use chrono::Utc;
use tracing::info;

use educollab_shared::{EntityId, MemberRole, ValidationError};
use educollab_store::{TeamMember, User};

use crate::error::{ClientError, Result};
use crate::fanout::Notified;
use crate::invalidation::Mutation;
use crate::keys::QueryKey;
use crate::state::Platform;

impl Platform {
    pub async fn team_members(&self, project_id: &EntityId) -> Result<Vec<TeamMember>> {
        self.cache
            .fetch_as(&QueryKey::TeamMembers(project_id.clone()))
            .await
    }

    /// Join `project_id` as a regular member.
    pub async fn join_project(&self, project_id: &EntityId) -> Result<Notified<TeamMember>> {
        self.join_project_as(project_id, MemberRole::Member).await
    }

    /// Join `project_id` with `role`.
    ///
    /// Projects that are not looking for members only admit users holding a
    /// pending invite.
    pub async fn join_project_as(
        &self,
        project_id: &EntityId,
        role: MemberRole,
    ) -> Result<Notified<TeamMember>> {
        let user = self.session.require_user()?;
        let invited = self.pending_invite_for(project_id).await?.is_some();
        self.join(&user, project_id, role, invited).await
    }

    pub(crate) async fn join(
        &self,
        user: &User,
        project_id: &EntityId,
        role: MemberRole,
        invited: bool,
    ) -> Result<Notified<TeamMember>> {
        let summary = self.project(project_id).await?;
        let members = self.team_members(project_id).await?;

        if members.iter().any(|m| m.user_id == user.id) {
            return Err(ClientError::Conflict(format!(
                "user {} is already on project {}",
                user.id, project_id
            )));
        }
        if let Some(max) = summary.project.max_team_size {
            if members.len() >= max as usize {
                return Err(ValidationError::TeamFull(max).into());
            }
        }
        if !summary.project.looking_for_members && !invited {
            return Err(ClientError::Unauthorized(
                "project is not looking for members".into(),
            ));
        }

        let member = TeamMember {
            id: EntityId::new(),
            user_id: user.id.clone(),
            project_id: project_id.clone(),
            role,
            joined_at: Utc::now(),
        };
        let member = self.resources.create(&member).await?;
        info!(project = %project_id, user = %user.id, role = %role, "joined project");

        self.confirm(Mutation::JoinTeam {
            project_id: project_id.clone(),
            user_id: user.id.clone(),
            user_email: user.email.clone(),
        })
        .await;

        let fanout = self.fanout.member_joined(&summary.project, user).await;
        self.deliver(&fanout).await;
        Ok(Notified {
            value: member,
            fanout,
        })
    }

    /// Owner-only removal of another member's record.
    pub async fn remove_team_member(&self, member_id: &EntityId) -> Result<()> {
        let member: TeamMember = self.resources.get(member_id).await?;
        let summary = self.require_owner(&member.project_id).await?;

        if member.user_id == summary.project.owner_id || member.role == MemberRole::Owner {
            return Err(ClientError::Unauthorized(
                "the project owner cannot be removed".into(),
            ));
        }

        self.resources.delete::<TeamMember>(member_id).await?;
        info!(project = %member.project_id, user = %member.user_id, "team member removed");
        self.confirm(Mutation::RemoveTeamMember {
            project_id: member.project_id,
        })
        .await;
        Ok(())
    }
}
