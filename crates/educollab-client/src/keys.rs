//! Query keys: the identity of one cached view.

use std::fmt;

use educollab_shared::EntityId;

/// A cached collection view, parameterised by the ids it filters on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    /// Every project, with derived team size, progress and rating.
    Projects,
    /// One project, with the same derived fields.
    Project(EntityId),
    TeamMembers(EntityId),
    /// Invites addressed to one invitee (email, or user id in legacy callers).
    TeamInvites(String),
    Milestones(EntityId),
    ProjectRatings(EntityId),
    /// One user's notifications, newest first.
    Notifications(EntityId),
    Comments(EntityId),
    Users,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Projects => f.write_str("projects"),
            QueryKey::Project(id) => write!(f, "project:{id}"),
            QueryKey::TeamMembers(id) => write!(f, "team-members:{id}"),
            QueryKey::TeamInvites(invitee) => write!(f, "team-invites:{invitee}"),
            QueryKey::Milestones(id) => write!(f, "milestones:{id}"),
            QueryKey::ProjectRatings(id) => write!(f, "project-ratings:{id}"),
            QueryKey::Notifications(id) => write!(f, "notifications:{id}"),
            QueryKey::Comments(id) => write!(f, "comments:{id}"),
            QueryKey::Users => f.write_str("users"),
        }
    }
}
