//! Mutation → invalidated keys.
//!
//! Every successful write is described by a [`Mutation`]; the keys it
//! invalidates are a pure function of that value so the whole dependency
//! graph lives in one table.

use educollab_shared::EntityId;
use tracing::debug;

use crate::cache::QueryCache;
use crate::keys::QueryKey;

/// A confirmed write, carrying the ids its dependent views are keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateProject { project_id: EntityId },
    DeleteProject { project_id: EntityId },
    /// Field edits and progress updates.
    UpdateProject { project_id: EntityId },
    /// Milestone create, edit or status change.
    SaveMilestone { project_id: EntityId },
    JoinTeam {
        project_id: EntityId,
        user_id: EntityId,
        user_email: String,
    },
    RemoveTeamMember { project_id: EntityId },
    CreateInvite { invitee_email: String },
    /// Invite accepted or declined.
    RespondToInvite { invitee_email: String },
    /// Rating added or changed.
    RateProject { project_id: EntityId },
    ReadNotifications { user_id: EntityId },
    CreateComment { project_id: EntityId },
    /// A fan-out notification landed in a user's inbox.
    NotificationCreated { user_id: EntityId },
    RegisterUser,
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::CreateProject { .. } => "create_project",
            Mutation::DeleteProject { .. } => "delete_project",
            Mutation::UpdateProject { .. } => "update_project",
            Mutation::SaveMilestone { .. } => "save_milestone",
            Mutation::JoinTeam { .. } => "join_team",
            Mutation::RemoveTeamMember { .. } => "remove_team_member",
            Mutation::CreateInvite { .. } => "create_invite",
            Mutation::RespondToInvite { .. } => "respond_to_invite",
            Mutation::RateProject { .. } => "rate_project",
            Mutation::ReadNotifications { .. } => "read_notifications",
            Mutation::CreateComment { .. } => "create_comment",
            Mutation::NotificationCreated { .. } => "notification_created",
            Mutation::RegisterUser => "register_user",
        }
    }

    /// Keys whose data may have changed as a side effect of this write.
    pub fn invalidated_keys(&self) -> Vec<QueryKey> {
        use QueryKey as K;

        match self {
            Mutation::CreateProject { project_id } => vec![
                K::Projects,
                K::Project(project_id.clone()),
                K::TeamMembers(project_id.clone()),
            ],
            Mutation::DeleteProject { project_id } => vec![
                K::Projects,
                K::TeamMembers(project_id.clone()),
                K::Project(project_id.clone()),
            ],
            Mutation::UpdateProject { project_id } => {
                vec![K::Projects, K::Project(project_id.clone())]
            }
            // The single-project summary carries milestone progress.
            Mutation::SaveMilestone { project_id } => vec![
                K::Milestones(project_id.clone()),
                K::Projects,
                K::Project(project_id.clone()),
            ],
            Mutation::JoinTeam {
                project_id,
                user_id,
                user_email,
            } => {
                let mut keys = vec![
                    K::TeamMembers(project_id.clone()),
                    K::Projects,
                    K::Project(project_id.clone()),
                    K::TeamInvites(user_id.to_string()),
                ];
                // Invite lists are fetched by email.
                if !user_email.is_empty() && user_email != user_id.as_str() {
                    keys.push(K::TeamInvites(user_email.clone()));
                }
                keys
            }
            Mutation::RemoveTeamMember { project_id } => vec![
                K::TeamMembers(project_id.clone()),
                K::Projects,
                K::Project(project_id.clone()),
            ],
            Mutation::CreateInvite { invitee_email }
            | Mutation::RespondToInvite { invitee_email } => {
                vec![K::TeamInvites(invitee_email.clone())]
            }
            Mutation::RateProject { project_id } => vec![
                K::ProjectRatings(project_id.clone()),
                K::Projects,
                K::Project(project_id.clone()),
            ],
            Mutation::ReadNotifications { user_id }
            | Mutation::NotificationCreated { user_id } => {
                vec![K::Notifications(user_id.clone())]
            }
            Mutation::CreateComment { project_id } => vec![K::Comments(project_id.clone())],
            Mutation::RegisterUser => vec![K::Users],
        }
    }
}

/// Runs the invalidation table against the query cache.
#[derive(Clone)]
pub struct Coordinator {
    cache: QueryCache,
}

impl Coordinator {
    pub fn new(cache: QueryCache) -> Self {
        Self { cache }
    }

    /// Invalidate everything `mutation` touched, then refetch observed keys.
    ///
    /// Call only once the write has been confirmed. Returns the number of
    /// keys refetched.
    pub async fn on_success(&self, mutation: &Mutation) -> usize {
        self.invalidate(mutation);
        self.cache.refetch_pending().await
    }

    fn invalidate(&self, mutation: &Mutation) {
        let keys = mutation.invalidated_keys();
        let scheduled = keys.iter().filter(|k| self.cache.invalidate(k)).count();
        debug!(
            mutation = mutation.name(),
            keys = keys.len(),
            scheduled,
            "invalidated dependent queries"
        );
    }
}
