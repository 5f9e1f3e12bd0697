//! Team invite lifecycle.
//!
//! An invite is created `pending` and moves once, to either `accepted` or
//! `rejected`. Both are terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InviteStatus::Pending)
    }

    /// Validate a status change and return the new status.
    pub fn transition(self, to: InviteStatus) -> Result<InviteStatus, InviteError> {
        match (self, to) {
            (InviteStatus::Pending, InviteStatus::Accepted)
            | (InviteStatus::Pending, InviteStatus::Rejected) => Ok(to),
            (from, _) if from.is_terminal() => Err(InviteError::Terminal(from)),
            (from, to) => Err(InviteError::InvalidTransition { from, to }),
        }
    }
}

impl Default for InviteStatus {
    fn default() -> Self {
        InviteStatus::Pending
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InviteError {
    #[error("Invite is already {0}")]
    Terminal(InviteStatus),

    #[error("Invite cannot move from {from} to {to}")]
    InvalidTransition { from: InviteStatus, to: InviteStatus },
}

/// Canonical form of an invitee address: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
