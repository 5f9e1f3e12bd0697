//! A user's authority over one project.

use educollab_store::{Project, TeamMember, User};

/// Role booleans derived from ownership and team membership.
///
/// Always recomputed from current data, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectAccess {
    pub is_owner: bool,
    pub is_team_member: bool,
    pub can_manage: bool,
}

impl ProjectAccess {
    /// Derive access for `user` (`None` = guest).
    ///
    /// `members` is `None` while the team list has not loaded; membership
    /// then reads as `false`.
    pub fn derive(project: &Project, user: Option<&User>, members: Option<&[TeamMember]>) -> Self {
        let Some(user) = user else {
            return Self::default();
        };

        let is_owner = project.owner_id == user.id;
        let is_team_member = members.is_some_and(|members| {
            members
                .iter()
                .any(|m| m.user_id == user.id && m.project_id == project.id)
        });

        Self {
            is_owner,
            is_team_member,
            can_manage: is_owner || is_team_member,
        }
    }

    pub fn is_guest(&self) -> bool {
        !self.can_manage
    }
}
