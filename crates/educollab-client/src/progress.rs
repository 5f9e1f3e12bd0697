//! Completion percentage of a project's milestones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use educollab_shared::MilestoneStatus;
use educollab_store::Milestone;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// Rounded to the nearest whole number; 0 with no milestones.
    pub percentage: u8,
}

impl Progress {
    pub fn of(milestones: &[Milestone]) -> Self {
        let total = milestones.len();
        let completed = milestones
            .iter()
            .filter(|m| m.status == MilestoneStatus::Completed)
            .count();
        Self {
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }
}

pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (completed.min(total) as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Patch body for a status change.
///
/// Entering `completed` stamps `completedAt` with `now`. Any other status
/// clears it so a milestone moved back out of `completed` no longer reads as
/// done.
pub fn status_patch(status: MilestoneStatus, now: DateTime<Utc>) -> Value {
    let completed_at = match status {
        MilestoneStatus::Completed => json!(now),
        _ => Value::Null,
    };
    json!({
        "status": status,
        "completedAt": completed_at,
        "updatedAt": now,
    })
}
