use educollab_shared::{Collection, EntityId};
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Transport error talking to the REST backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The REST backend answered with an unexpected status.
    #[error("Backend responded {status}: {body}")]
    Status { status: u16, body: String },

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record is not a JSON object or carries an unusable field.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// No record with this id in the collection.
    #[error("{collection}/{id} not found")]
    NotFound { collection: Collection, id: EntityId },

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// The database mutex was poisoned by a panicking writer.
    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
