use thiserror::Error;

use educollab_shared::{InviteError, ValidationError};
use educollab_store::StoreError;

/// Errors surfaced to UI callers.
///
/// Local validation failures never reach the store. Every other failure
/// leaves the cache untouched.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Bad local input.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Entity absent, including a login for an unknown email.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The acting user may not perform this operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A uniqueness invariant rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transport or store failure.
    #[error("Network failure: {0}")]
    Network(#[source] StoreError),

    /// A cached value did not decode as the requested view.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persisted session could not be written.
    #[error("Session storage error: {0}")]
    SessionStorage(String),
}

impl From<StoreError> for ClientError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { collection, id } => {
                ClientError::NotFound(format!("{collection}/{id}"))
            }
            StoreError::Conflict(msg) => ClientError::Conflict(msg),
            other => ClientError::Network(other),
        }
    }
}

impl From<InviteError> for ClientError {
    fn from(e: InviteError) -> Self {
        match e {
            InviteError::Terminal(status) => {
                ClientError::Validation(ValidationError::InviteClosed(status.to_string()))
            }
            other => ClientError::Validation(ValidationError::InvalidValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
