use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use educollab_shared::constants::DEFAULT_MAX_TEAM_SIZE;
use educollab_shared::{Difficulty, EntityId, MemberRole, ProjectStatus, ValidationError};
use educollab_store::{Project, TeamMember};

use crate::access::ProjectAccess;
use crate::commands::non_empty;
use crate::error::{ClientError, Result};
use crate::invalidation::Mutation;
use crate::keys::QueryKey;
use crate::queries::{filter_by_status, ProjectSummary, StatusFilter};
use crate::state::Platform;

/// Fields of a project form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub looking_for_members: bool,
    #[serde(default)]
    pub max_team_size: Option<u32>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
}

/// Partial project edit; `None` leaves a field alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub looking_for_members: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_team_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
}

fn validate_team_size(size: u32) -> Result<u32> {
    if size == 0 {
        return Err(ValidationError::InvalidTeamSize(size).into());
    }
    Ok(size)
}

impl Platform {
    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn projects(&self) -> Result<Vec<ProjectSummary>> {
        self.cache.fetch_as(&QueryKey::Projects).await
    }

    pub async fn projects_with_status(&self, filter: StatusFilter) -> Result<Vec<ProjectSummary>> {
        Ok(filter_by_status(&self.projects().await?, filter))
    }

    pub async fn project(&self, id: &EntityId) -> Result<ProjectSummary> {
        self.cache.fetch_as(&QueryKey::Project(id.clone())).await
    }

    /// Access of the signed-in user to `project_id`.
    ///
    /// A team list that fails to load counts as not loaded: membership is
    /// denied rather than the whole call failing.
    pub async fn access(&self, project_id: &EntityId) -> Result<ProjectAccess> {
        let summary = self.project(project_id).await?;
        let user = self.session.current_user();
        let members = match self.team_members(project_id).await {
            Ok(members) => Some(members),
            Err(e) => {
                warn!(project = %project_id, error = %e, "team list unavailable, failing closed");
                None
            }
        };
        Ok(ProjectAccess::derive(
            &summary.project,
            user.as_ref(),
            members.as_deref(),
        ))
    }

    pub(crate) async fn require_owner(&self, project_id: &EntityId) -> Result<ProjectSummary> {
        let user = self.session.require_user()?;
        let summary = self.project(project_id).await?;
        if summary.project.owner_id != user.id {
            return Err(ClientError::Unauthorized(
                "only the project owner may do this".into(),
            ));
        }
        Ok(summary)
    }

    pub(crate) async fn require_manager(&self, project_id: &EntityId) -> Result<ProjectAccess> {
        self.session.require_user()?;
        let access = self.access(project_id).await?;
        if !access.can_manage {
            return Err(ClientError::Unauthorized(
                "only the owner or team members may do this".into(),
            ));
        }
        Ok(access)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a project owned by the signed-in user.
    ///
    /// The owner's team record is written afterwards; if that write fails
    /// the project still stands and ownership alone grants access.
    pub async fn create_project(&self, form: NewProject) -> Result<Project> {
        let title = non_empty("title", &form.title)?;
        let max_team_size = validate_team_size(form.max_team_size.unwrap_or(DEFAULT_MAX_TEAM_SIZE))?;
        let owner = self.session.require_user()?;
        let now = Utc::now();

        let project = Project {
            id: EntityId::new(),
            title,
            description: form.description.trim().to_string(),
            status: form.status,
            difficulty: form.difficulty,
            tags: form.tags,
            owner_id: owner.id.clone(),
            looking_for_members: form.looking_for_members,
            max_team_size: Some(max_team_size),
            deadline: form.deadline,
            repository_url: form.repository_url,
            demo_url: form.demo_url,
            progress: 0,
            created_at: Some(now),
            updated_at: Some(now),
        };
        let project = self.resources.create(&project).await?;
        info!(project = %project.id, owner = %owner.id, "project created");

        let owner_record = TeamMember {
            id: EntityId::new(),
            user_id: owner.id.clone(),
            project_id: project.id.clone(),
            role: MemberRole::Owner,
            joined_at: now,
        };
        if let Err(e) = self.resources.create(&owner_record).await {
            warn!(project = %project.id, error = %e, "could not record project owner as team member");
        }

        self.confirm(Mutation::CreateProject {
            project_id: project.id.clone(),
        })
        .await;
        Ok(project)
    }

    /// Owner-only partial edit.
    pub async fn update_project(&self, id: &EntityId, patch: ProjectPatch) -> Result<Project> {
        if let Some(title) = &patch.title {
            non_empty("title", title)?;
        }
        if let Some(size) = patch.max_team_size {
            validate_team_size(size)?;
        }
        self.require_owner(id).await?;

        let mut body: Map<String, Value> = match serde_json::to_value(&patch)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Some(Value::String(title)) = body.get_mut("title") {
            *title = title.trim().to_string();
        }
        body.insert("updatedAt".into(), json!(Utc::now()));

        let project = self.resources.update(id, Value::Object(body)).await?;
        self.confirm(Mutation::UpdateProject { project_id: id.clone() }).await;
        Ok(project)
    }

    /// Set the manually reported progress, clamped to 0..=100.
    pub async fn update_project_progress(&self, id: &EntityId, percentage: i64) -> Result<Project> {
        self.require_manager(id).await?;
        let progress = percentage.clamp(0, 100);
        let project = self
            .resources
            .update(id, json!({ "progress": progress, "updatedAt": Utc::now() }))
            .await?;
        self.confirm(Mutation::UpdateProject { project_id: id.clone() }).await;
        Ok(project)
    }

    pub async fn delete_project(&self, id: &EntityId) -> Result<()> {
        self.require_owner(id).await?;
        self.resources.delete::<Project>(id).await?;
        info!(project = %id, "project deleted");
        self.confirm(Mutation::DeleteProject { project_id: id.clone() }).await;
        Ok(())
    }
}
