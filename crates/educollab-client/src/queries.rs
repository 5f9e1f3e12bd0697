//! Read side: how each [`QueryKey`] is loaded, and the derived views.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use educollab_shared::invite::normalize_email;
use educollab_shared::{EntityId, ProjectStatus, ValidationError};
use educollab_store::{
    Comment, Filter, Milestone, Notification, Project, ProjectRating, ResourceClient, SortOrder,
    StoreError, TeamInvite, TeamMember, User,
};

use crate::cache::QueryLoader;
use crate::error::Result;
use crate::keys::QueryKey;
use crate::progress::Progress;
use crate::rating::RatingSummary;

/// A project together with the figures derived from its child collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub team_size: usize,
    pub milestone_progress: Progress,
    pub rating: RatingSummary,
}

impl ProjectSummary {
    fn derive(
        project: Project,
        members: &[TeamMember],
        milestones: &[Milestone],
        ratings: &[ProjectRating],
    ) -> Self {
        Self {
            team_size: members.len(),
            milestone_progress: Progress::of(milestones),
            rating: RatingSummary::of(ratings),
            project,
        }
    }

    /// Whether another member fits under `maxTeamSize`.
    pub fn has_open_seat(&self) -> bool {
        self.project
            .max_team_size
            .map_or(true, |max| self.team_size < max as usize)
    }
}

/// Loads every query key from the resource store.
#[derive(Clone)]
pub struct StoreLoader {
    resources: ResourceClient,
}

impl StoreLoader {
    pub fn new(resources: ResourceClient) -> Self {
        Self { resources }
    }

    async fn project_summaries(&self) -> Result<Vec<ProjectSummary>> {
        let newest_first = Filter::all().sort_by("createdAt", SortOrder::Desc);
        let all = Filter::all();
        let (projects, members, milestones, ratings) = futures::try_join!(
            self.resources.list::<Project>(&newest_first),
            self.resources.list::<TeamMember>(&all),
            self.resources.list::<Milestone>(&all),
            self.resources.list::<ProjectRating>(&all),
        )?;

        let members = group_by_project(members, |m| &m.project_id);
        let milestones = group_by_project(milestones, |m| &m.project_id);
        let ratings = group_by_project(ratings, |r| &r.project_id);

        Ok(projects
            .into_iter()
            .map(|p| {
                let id = p.id.clone();
                ProjectSummary::derive(
                    p,
                    slice(&members, &id),
                    slice(&milestones, &id),
                    slice(&ratings, &id),
                )
            })
            .collect())
    }

    async fn project_summary(&self, id: &EntityId) -> Result<ProjectSummary> {
        let by_project = Filter::all().eq("projectId", id);
        let (project, members, milestones, ratings) = futures::try_join!(
            self.resources.get::<Project>(id),
            self.resources.list::<TeamMember>(&by_project),
            self.resources.list::<Milestone>(&by_project),
            self.resources.list::<ProjectRating>(&by_project),
        )?;
        Ok(ProjectSummary::derive(project, &members, &milestones, &ratings))
    }

    /// Invites addressed to `invitee`, an email or a user id.
    async fn invites_for(&self, invitee: &str) -> Result<Vec<TeamInvite>> {
        let email = if invitee.contains('@') {
            normalize_email(invitee)
        } else {
            match self.resources.get::<User>(&EntityId::from(invitee)).await {
                Ok(user) => normalize_email(&user.email),
                Err(StoreError::NotFound { .. }) => return Ok(Vec::new()),
                Err(e) => return Err(e.into()),
            }
        };
        Ok(self
            .resources
            .list(&Filter::all().eq("inviteeEmail", email))
            .await?)
    }

    async fn notifications_for(&self, user_id: &EntityId) -> Result<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self
            .resources
            .list(
                &Filter::all()
                    .eq("userId", user_id)
                    .sort_by("createdAt", SortOrder::Desc),
            )
            .await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }
}

#[async_trait]
impl QueryLoader for StoreLoader {
    async fn load(&self, key: &QueryKey) -> Result<Value> {
        let by_project = |id: &EntityId| Filter::all().eq("projectId", id);
        let value = match key {
            QueryKey::Projects => serde_json::to_value(self.project_summaries().await?)?,
            QueryKey::Project(id) => serde_json::to_value(self.project_summary(id).await?)?,
            QueryKey::TeamMembers(id) => serde_json::to_value(
                self.resources
                    .list::<TeamMember>(&by_project(id).sort_by("joinedAt", SortOrder::Asc))
                    .await?,
            )?,
            QueryKey::TeamInvites(invitee) => serde_json::to_value(self.invites_for(invitee).await?)?,
            QueryKey::Milestones(id) => serde_json::to_value(
                self.resources
                    .list::<Milestone>(&by_project(id).sort_by("createdAt", SortOrder::Asc))
                    .await?,
            )?,
            QueryKey::ProjectRatings(id) => serde_json::to_value(
                self.resources.list::<ProjectRating>(&by_project(id)).await?,
            )?,
            QueryKey::Notifications(user_id) => {
                serde_json::to_value(self.notifications_for(user_id).await?)?
            }
            QueryKey::Comments(id) => serde_json::to_value(
                self.resources
                    .list::<Comment>(&by_project(id).sort_by("createdAt", SortOrder::Desc))
                    .await?,
            )?,
            QueryKey::Users => serde_json::to_value(self.resources.list::<User>(&Filter::all()).await?)?,
        };
        Ok(value)
    }
}

fn group_by_project<T>(
    records: Vec<T>,
    project_of: impl Fn(&T) -> &EntityId,
) -> HashMap<EntityId, Vec<T>> {
    let mut grouped: HashMap<EntityId, Vec<T>> = HashMap::new();
    for record in records {
        grouped.entry(project_of(&record).clone()).or_default().push(record);
    }
    grouped
}

fn slice<'a, T>(grouped: &'a HashMap<EntityId, Vec<T>>, id: &EntityId) -> &'a [T] {
    grouped.get(id).map(Vec::as_slice).unwrap_or(&[])
}

// ---------------------------------------------------------------------------
// List helpers
// ---------------------------------------------------------------------------

/// Project list filter: everything, or one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ProjectStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: ProjectStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(StatusFilter::All),
            other => Ok(StatusFilter::Only(other.parse()?)),
        }
    }
}

pub fn filter_by_status(projects: &[ProjectSummary], filter: StatusFilter) -> Vec<ProjectSummary> {
    projects
        .iter()
        .filter(|p| filter.matches(p.project.status))
        .cloned()
        .collect()
}

/// Split a comma-separated tag field, dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
