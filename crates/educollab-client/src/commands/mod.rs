//! Read accessors and mutation entry points, grouped by domain.
//!
//! Each mutation follows the same shape: validate locally, check the acting
//! user's authority against cached views, write, then hand the matching
//! [`Mutation`](crate::invalidation::Mutation) to the coordinator. A failed
//! write returns before invalidation.

pub mod comments;
pub mod invites;
pub mod milestones;
pub mod notifications;
pub mod projects;
pub mod ratings;
pub mod session;
pub mod team;

use educollab_shared::ValidationError;

use crate::error::Result;

/// Trimmed `value`, or `EmptyField(field)`.
pub(crate) fn non_empty(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field).into());
    }
    Ok(trimmed.to_string())
}
