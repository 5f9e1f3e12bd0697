use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use educollab_shared::EntityId;
use educollab_store::ProjectRating;

use crate::error::{ClientError, Result};
use crate::invalidation::Mutation;
use crate::keys::QueryKey;
use crate::rating::{find_user_rating, validate_rating, RatingOutcome, RatingSummary};
use crate::state::Platform;

impl Platform {
    pub async fn ratings(&self, project_id: &EntityId) -> Result<Vec<ProjectRating>> {
        self.cache
            .fetch_as(&QueryKey::ProjectRatings(project_id.clone()))
            .await
    }

    pub async fn rating_summary(&self, project_id: &EntityId) -> Result<RatingSummary> {
        Ok(RatingSummary::of(&self.ratings(project_id).await?))
    }

    /// The signed-in user's rating of `project_id`.
    pub async fn my_rating(&self, project_id: &EntityId) -> Result<Option<ProjectRating>> {
        let Some(user) = self.session.current_user() else {
            return Ok(None);
        };
        let ratings = self.ratings(project_id).await?;
        Ok(find_user_rating(&ratings, project_id, &user).cloned())
    }

    /// Rate a project once. A second rating by the same user writes
    /// nothing and returns the existing one; use
    /// [`update_rating`](Self::update_rating) to change it.
    pub async fn add_rating(&self, project_id: &EntityId, rating: i64) -> Result<RatingOutcome> {
        let rating = validate_rating(rating)?;
        let user = self.session.require_user()?;

        let ratings = self.ratings(project_id).await?;
        if let Some(existing) = find_user_rating(&ratings, project_id, &user) {
            debug!(project = %project_id, user = %user.id, "user already rated, returning existing");
            return Ok(RatingOutcome::Existing(existing.clone()));
        }

        let record = ProjectRating {
            id: EntityId::new(),
            project_id: project_id.clone(),
            user_id: user.id.clone(),
            rating,
            created_at: Utc::now(),
        };
        let created = self.resources.create(&record).await?;
        info!(project = %project_id, user = %user.id, rating, "project rated");

        self.confirm(Mutation::RateProject {
            project_id: project_id.clone(),
        })
        .await;
        Ok(RatingOutcome::Created(created))
    }

    /// Change the signed-in user's own rating.
    pub async fn update_rating(&self, rating_id: &EntityId, rating: i64) -> Result<ProjectRating> {
        let rating = validate_rating(rating)?;
        let user = self.session.require_user()?;

        let current: ProjectRating = self.resources.get(rating_id).await?;
        if current.user_id != user.id {
            return Err(ClientError::Unauthorized(
                "ratings can only be changed by their author".into(),
            ));
        }

        let updated = self
            .resources
            .update(rating_id, json!({ "rating": rating }))
            .await?;
        self.confirm(Mutation::RateProject {
            project_id: current.project_id,
        })
        .await;
        Ok(updated)
    }
}
