//! Average rating and star rendering.

use serde::{Deserialize, Serialize};

use educollab_shared::constants::{MAX_RATING, MIN_RATING, STAR_EMPTY, STAR_FILLED};
use educollab_shared::{EntityId, ValidationError};
use educollab_store::{ProjectRating, User};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Arithmetic mean, 0 with no ratings.
    pub average: f64,
    pub count: usize,
}

impl RatingSummary {
    pub fn of(ratings: &[ProjectRating]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let sum: u64 = ratings.iter().map(|r| u64::from(r.rating)).sum();
        Self {
            average: sum as f64 / ratings.len() as f64,
            count: ratings.len(),
        }
    }

    /// Average with one decimal, e.g. `4.3`.
    pub fn display(&self) -> String {
        format!("{:.1}", self.average)
    }

    /// `round(average)` filled stars out of five.
    pub fn stars(&self) -> String {
        let max = usize::from(MAX_RATING);
        let filled = (self.average.round().max(0.0) as usize).min(max);
        std::iter::repeat(STAR_FILLED)
            .take(filled)
            .chain(std::iter::repeat(STAR_EMPTY).take(max - filled))
            .collect()
    }
}

/// What `add_rating` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingOutcome {
    Created(ProjectRating),
    /// The user had already rated; nothing was written.
    Existing(ProjectRating),
}

impl RatingOutcome {
    pub fn rating(&self) -> &ProjectRating {
        match self {
            RatingOutcome::Created(r) | RatingOutcome::Existing(r) => r,
        }
    }
}

pub fn validate_rating(rating: i64) -> Result<u8, ValidationError> {
    if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&rating) {
        Ok(rating as u8)
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

/// The user's existing rating in a project's rating list.
pub fn find_user_rating<'a>(
    ratings: &'a [ProjectRating],
    project_id: &EntityId,
    user: &User,
) -> Option<&'a ProjectRating> {
    ratings
        .iter()
        .find(|r| r.user_id == user.id && &r.project_id == project_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ratings(values: &[u8]) -> Vec<ProjectRating> {
        values
            .iter()
            .enumerate()
            .map(|(i, &rating)| ProjectRating {
                id: EntityId::from(i as u64),
                project_id: EntityId::from("P1"),
                user_id: EntityId::from(format!("U{i}")),
                rating,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn empty_average_is_zero() {
        let s = RatingSummary::of(&[]);
        assert_eq!(s.average, 0.0);
        assert_eq!(s.display(), "0.0");
        assert_eq!(s.stars(), "☆☆☆☆☆");
    }

    #[test]
    fn mean_and_display() {
        let s = RatingSummary::of(&ratings(&[5, 4, 4]));
        assert_eq!(s.count, 3);
        assert_eq!(s.display(), "4.3");
        assert_eq!(s.stars(), "★★★★☆");
        assert!((0.0..=5.0).contains(&s.average));
    }

    #[test]
    fn range_is_one_to_five() {
        assert_eq!(validate_rating(1), Ok(1));
        assert_eq!(validate_rating(5), Ok(5));
        assert_eq!(validate_rating(0), Err(ValidationError::RatingOutOfRange(0)));
        assert_eq!(validate_rating(6), Err(ValidationError::RatingOutOfRange(6)));
    }
}
