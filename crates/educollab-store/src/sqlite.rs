//! [`ResourceStore`] backed by the embedded SQLite [`Database`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use educollab_shared::{Collection, EntityId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::resource::{Filter, ResourceStore};

/// Embedded resource store. Statements are short, so the connection is
/// shared behind a plain mutex that is never held across an await.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open_at(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

#[async_trait]
impl ResourceStore for SqliteStore {
    async fn list(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>> {
        self.db()?.list_documents(collection, filter)
    }

    async fn get(&self, collection: Collection, id: &EntityId) -> Result<Value> {
        self.db()?.get_document(collection, id)
    }

    async fn create(&self, collection: Collection, record: Value) -> Result<Value> {
        let created = self.db()?.insert_document(collection, record)?;
        tracing::debug!(collection = %collection, id = ?created.get("id"), "record created");
        Ok(created)
    }

    async fn update(&self, collection: Collection, id: &EntityId, patch: Value) -> Result<Value> {
        self.db()?.update_document(collection, id, patch)
    }

    async fn delete(&self, collection: Collection, id: &EntityId) -> Result<()> {
        if self.db()?.delete_document(collection, id)? {
            tracing::debug!(collection = %collection, id = %id, "record deleted");
            Ok(())
        } else {
            Err(StoreError::NotFound {
                collection,
                id: id.clone(),
            })
        }
    }
}
