use chrono::Utc;
use tracing::info;

use educollab_shared::EntityId;
use educollab_store::Comment;

use crate::commands::non_empty;
use crate::error::Result;
use crate::invalidation::Mutation;
use crate::keys::QueryKey;
use crate::state::Platform;

impl Platform {
    /// Comments on a project, newest first.
    pub async fn comments(&self, project_id: &EntityId) -> Result<Vec<Comment>> {
        self.cache
            .fetch_as(&QueryKey::Comments(project_id.clone()))
            .await
    }

    pub async fn create_comment(&self, project_id: &EntityId, content: &str) -> Result<Comment> {
        let content = non_empty("content", content)?;
        let author = self.session.require_user()?;

        let now = Utc::now();
        let comment = Comment {
            id: EntityId::new(),
            content,
            author_id: author.id.clone(),
            project_id: project_id.clone(),
            created_at: now,
            updated_at: now,
        };
        let comment = self.resources.create(&comment).await?;
        info!(project = %project_id, author = %author.id, "comment posted");

        self.confirm(Mutation::CreateComment {
            project_id: project_id.clone(),
        })
        .await;
        Ok(comment)
    }
}
