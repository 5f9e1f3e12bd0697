use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use educollab_shared::{EntityId, MilestoneStatus};
use educollab_store::Milestone;

use crate::commands::non_empty;
use crate::error::Result;
use crate::invalidation::Mutation;
use crate::keys::QueryKey;
use crate::progress::{status_patch, Progress};
use crate::state::Platform;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMilestone {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: MilestoneStatus,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Partial milestone edit. Status goes through
/// [`Platform::set_milestone_status`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl Platform {
    pub async fn milestones(&self, project_id: &EntityId) -> Result<Vec<Milestone>> {
        self.cache
            .fetch_as(&QueryKey::Milestones(project_id.clone()))
            .await
    }

    pub async fn progress(&self, project_id: &EntityId) -> Result<Progress> {
        Ok(Progress::of(&self.milestones(project_id).await?))
    }

    pub async fn create_milestone(
        &self,
        project_id: &EntityId,
        form: NewMilestone,
    ) -> Result<Milestone> {
        let title = non_empty("title", &form.title)?;
        self.require_manager(project_id).await?;

        let now = Utc::now();
        let milestone = Milestone {
            id: EntityId::new(),
            project_id: project_id.clone(),
            title,
            description: form.description.trim().to_string(),
            status: form.status,
            due_date: form.due_date.filter(|d| !d.trim().is_empty()),
            completed_at: (form.status == MilestoneStatus::Completed).then_some(now),
            created_at: now,
            updated_at: now,
        };
        let milestone = self.resources.create(&milestone).await?;
        info!(project = %project_id, milestone = %milestone.id, "milestone created");

        self.confirm(Mutation::SaveMilestone {
            project_id: project_id.clone(),
        })
        .await;
        Ok(milestone)
    }

    pub async fn update_milestone(&self, id: &EntityId, patch: MilestonePatch) -> Result<Milestone> {
        if let Some(title) = &patch.title {
            non_empty("title", title)?;
        }
        let current: Milestone = self.resources.get(id).await?;
        self.require_manager(&current.project_id).await?;

        let mut body: Map<String, Value> = match serde_json::to_value(&patch)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Some(Value::String(title)) = body.get_mut("title") {
            *title = title.trim().to_string();
        }
        body.insert("updatedAt".into(), json!(Utc::now()));

        let milestone = self.resources.update(id, Value::Object(body)).await?;
        self.confirm(Mutation::SaveMilestone {
            project_id: current.project_id,
        })
        .await;
        Ok(milestone)
    }

    /// Move a milestone to `status`, stamping `completedAt` on entry into
    /// `completed` and clearing it otherwise.
    pub async fn set_milestone_status(
        &self,
        id: &EntityId,
        status: MilestoneStatus,
    ) -> Result<Milestone> {
        let current: Milestone = self.resources.get(id).await?;
        self.require_manager(&current.project_id).await?;

        let milestone = self
            .resources
            .update(id, status_patch(status, Utc::now()))
            .await?;
        info!(milestone = %id, from = %current.status, to = %status, "milestone status changed");

        self.confirm(Mutation::SaveMilestone {
            project_id: current.project_id,
        })
        .await;
        Ok(milestone)
    }
}
