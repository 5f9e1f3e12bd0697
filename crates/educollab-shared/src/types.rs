use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Canonical identifier of any stored entity.
///
/// Backends hand out ids either as JSON strings or as JSON numbers. Both are
/// normalised to their decimal/string form when deserialised, so `7` and
/// `"7"` compare equal everywhere above the data-access boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    /// Fresh random identifier for locally created records.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl PartialEq<str> for EntityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => EntityId::from(s),
            Raw::Signed(n) => EntityId::from(n),
            Raw::Unsigned(n) => EntityId::from(n),
        })
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// Named REST collections of the resource backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Projects,
    TeamMembers,
    TeamInvites,
    Milestones,
    ProjectRatings,
    Notifications,
    Comments,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Projects,
        Collection::TeamMembers,
        Collection::TeamInvites,
        Collection::Milestones,
        Collection::ProjectRatings,
        Collection::Notifications,
        Collection::Comments,
        Collection::Users,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::TeamMembers => "team-members",
            Collection::TeamInvites => "team-invites",
            Collection::Milestones => "milestones",
            Collection::ProjectRatings => "project-ratings",
            Collection::Notifications => "notifications",
            Collection::Comments => "comments",
            Collection::Users => "users",
        }
    }

    /// Whether records of this collection carry a `projectId` back-reference.
    pub fn is_project_child(&self) -> bool {
        matches!(
            self,
            Collection::TeamMembers
                | Collection::TeamInvites
                | Collection::Milestones
                | Collection::ProjectRatings
                | Collection::Comments
        )
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "collection",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(ValidationError::InvalidValue {
                        field: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Platform role chosen at registration.
    UserRole {
        Student => "student",
        Teacher => "teacher",
        Mentor => "mentor",
    }
}

wire_enum! {
    ProjectStatus {
        Planning => "planning",
        InProgress => "in_progress",
        Completed => "completed",
        Archived => "archived",
    }
}

wire_enum! {
    Difficulty {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
}

wire_enum! {
    /// Role of a user inside one project's team.
    MemberRole {
        Owner => "owner",
        Member => "member",
        Mentor => "mentor",
    }
}

wire_enum! {
    /// Milestone status. Any state is reachable from any state.
    MilestoneStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

wire_enum! {
    NotificationKind {
        Invite => "invite",
        Milestone => "milestone",
        Comment => "comment",
        Rating => "rating",
        System => "system",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Beginner
    }
}

impl Default for MilestoneStatus {
    fn default() -> Self {
        MilestoneStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_compare_equal() {
        let from_number: EntityId = serde_json::from_str("42").unwrap();
        let from_string: EntityId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number, "42");
    }

    #[test]
    fn ids_serialize_as_strings() {
        let id = EntityId::from(7u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn collection_names_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(collection.as_str().parse::<Collection>().unwrap(), collection);
        }
        assert!("likes".parse::<Collection>().is_err());
    }

    #[test]
    fn wire_names_match_backend() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::from_str::<NotificationKind>("\"system\"").unwrap(),
            NotificationKind::System
        );
        assert!("done".parse::<MilestoneStatus>().is_err());
    }

    #[test]
    fn only_child_collections_reference_projects() {
        assert!(Collection::Milestones.is_project_child());
        assert!(!Collection::Projects.is_project_child());
        assert!(!Collection::Notifications.is_project_child());
    }
}
