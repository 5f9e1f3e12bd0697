//! Entity records exchanged with the resource backend.
//!
//! Field names follow the backend's camelCase JSON. Every identifier is an
//! [`EntityId`], so numeric and string ids coming from different backends
//! are normalised on deserialisation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use educollab_shared::{
    Collection, Difficulty, EntityId, InviteStatus, MemberRole, MilestoneStatus,
    NotificationKind, ProjectStatus, UserRole,
};

use crate::resource::Resource;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    /// Unique across users.
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Set once at creation.
    pub owner_id: EntityId,
    #[serde(default)]
    pub looking_for_members: bool,
    #[serde(default)]
    pub max_team_size: Option<u32>,
    /// Free-form date entered by the owner.
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
    /// Manually reported progress, 0..=100.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// At most one record per (user, project).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: EntityId,
    pub user_id: EntityId,
    pub project_id: EntityId,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamInvite {
    pub id: EntityId,
    pub project_id: EntityId,
    pub invitee_email: String,
    pub inviter_id: EntityId,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Milestone
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: EntityId,
    pub project_id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: MilestoneStatus,
    #[serde(default)]
    pub due_date: Option<String>,
    /// Present only while the milestone is completed.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// At most one record per (user, project). `rating` is within 1..=5.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRating {
    pub id: EntityId,
    pub project_id: EntityId,
    pub user_id: EntityId,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: EntityId,
    pub content: String,
    pub author_id: EntityId,
    pub project_id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: EntityId,
    pub user_id: EntityId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub related_id: Option<EntityId>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Resource bindings
// ---------------------------------------------------------------------------

macro_rules! resource {
    ($model:ty => $collection:expr) => {
        impl Resource for $model {
            const COLLECTION: Collection = $collection;

            fn id(&self) -> &EntityId {
                &self.id
            }
        }
    };
}

resource!(User => Collection::Users);
resource!(Project => Collection::Projects);
resource!(TeamMember => Collection::TeamMembers);
resource!(TeamInvite => Collection::TeamInvites);
resource!(Milestone => Collection::Milestones);
resource!(ProjectRating => Collection::ProjectRatings);
resource!(Comment => Collection::Comments);
resource!(Notification => Collection::Notifications);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_records_with_numeric_ids_decode() {
        let raw = r#"{
            "id": 3,
            "userId": 12,
            "projectId": "7",
            "role": "member",
            "joinedAt": "2024-03-01T10:00:00.000Z"
        }"#;
        let member: TeamMember = serde_json::from_str(raw).unwrap();
        assert_eq!(member.user_id, "12");
        assert_eq!(member.project_id, EntityId::from(7u64));
    }

    #[test]
    fn notification_kind_uses_type_field() {
        let raw = r#"{
            "id": "n1",
            "userId": "u1",
            "type": "invite",
            "title": "t",
            "message": "m",
            "isRead": false,
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let n: Notification = serde_json::from_str(raw).unwrap();
        assert_eq!(n.kind, NotificationKind::Invite);
        assert!(n.related_id.is_none());

        let back = serde_json::to_value(&n).unwrap();
        assert_eq!(back["type"], "invite");
    }

    #[test]
    fn sparse_projects_fill_defaults() {
        let raw = r#"{ "id": 1, "title": "Robot", "ownerId": 2 }"#;
        let p: Project = serde_json::from_str(raw).unwrap();
        assert_eq!(p.status, ProjectStatus::Planning);
        assert!(p.tags.is_empty());
        assert!(!p.looking_for_members);
        assert_eq!(p.progress, 0);
    }
}
