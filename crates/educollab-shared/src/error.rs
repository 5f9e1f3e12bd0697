use thiserror::Error;

/// Bad local input. Never reaches the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i64),

    #[error("Maximum team size must be at least 1, got {0}")]
    InvalidTeamSize(u32),

    #[error("Team is full ({0} members)")]
    TeamFull(u32),

    #[error("Invite is already {0}")]
    InviteClosed(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}
