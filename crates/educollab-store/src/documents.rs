//! CRUD operations on the `documents` table.

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter};
use serde_json::{Map, Value};

use educollab_shared::{Collection, EntityId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::resource::{canonicalize_record, Filter, FilterValue, SortOrder};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new record, assigning an id when it has none.
    pub fn insert_document(&self, collection: Collection, record: Value) -> Result<Value> {
        let map = canonicalize_record(record)?;
        let id = record_id(&map)?;
        let body = Value::Object(map);

        self.conn()
            .execute(
                "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
                params![collection.as_str(), id, serde_json::to_string(&body)?],
            )
            .map_err(map_write_error)?;

        Ok(body)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single record by id.
    pub fn get_document(&self, collection: Collection, id: &EntityId) -> Result<Value> {
        let body: String = self
            .conn()
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound {
                    collection,
                    id: id.clone(),
                },
                other => StoreError::Sqlite(other),
            })?;

        Ok(serde_json::from_str(&body)?)
    }

    /// List records matching `filter`, in insertion order unless sorted.
    pub fn list_documents(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>> {
        filter.validate()?;

        let mut sql = String::from("SELECT body FROM documents WHERE collection = ?1");
        let mut args: Vec<SqlValue> = vec![SqlValue::Text(collection.as_str().to_string())];

        for (field, value) in &filter.conditions {
            args.push(SqlValue::Text(format!("$.{field}")));
            let path = args.len();
            match value {
                FilterValue::Text(s) => {
                    args.push(SqlValue::Text(s.clone()));
                    sql.push_str(&format!(
                        " AND CAST(json_extract(body, ?{path}) AS TEXT) = ?{}",
                        args.len()
                    ));
                }
                FilterValue::Bool(b) => {
                    args.push(SqlValue::Integer(i64::from(*b)));
                    sql.push_str(&format!(
                        " AND json_extract(body, ?{path}) = ?{}",
                        args.len()
                    ));
                }
            }
        }

        match &filter.sort {
            Some((field, order)) => {
                args.push(SqlValue::Text(format!("$.{field}")));
                let direction = match order {
                    SortOrder::Asc => "ASC",
                    SortOrder::Desc => "DESC",
                };
                sql.push_str(&format!(
                    " ORDER BY json_extract(body, ?{}) {direction}, seq ASC",
                    args.len()
                ));
            }
            None => sql.push_str(" ORDER BY seq ASC"),
        }

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Shallow-merge `patch` into the stored record. The id never changes.
    pub fn update_document(
        &self,
        collection: Collection,
        id: &EntityId,
        patch: Value,
    ) -> Result<Value> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::InvalidRecord("patch is not a JSON object".into()));
        };

        let mut current = self.get_document(collection, id)?;
        let Some(body) = current.as_object_mut() else {
            return Err(StoreError::InvalidRecord(format!(
                "{collection}/{id} is not a JSON object"
            )));
        };

        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            let value = match value {
                Value::Number(n) if key.ends_with("Id") => Value::String(n.to_string()),
                other => other,
            };
            body.insert(key, value);
        }

        self.conn()
            .execute(
                "UPDATE documents SET body = ?1 WHERE collection = ?2 AND id = ?3",
                params![
                    serde_json::to_string(&current)?,
                    collection.as_str(),
                    id.as_str()
                ],
            )
            .map_err(map_write_error)?;

        Ok(current)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a record.  Returns `true` if a row was deleted.
    ///
    /// Deleting a project also deletes every child record referencing it,
    /// in the same transaction.
    pub fn delete_document(&mut self, collection: Collection, id: &EntityId) -> Result<bool> {
        let tx = self.conn_mut().transaction()?;

        let affected = tx.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id.as_str()],
        )?;

        if affected > 0 && collection == Collection::Projects {
            for child in Collection::ALL.into_iter().filter(|c| c.is_project_child()) {
                let removed = tx.execute(
                    "DELETE FROM documents
                     WHERE collection = ?1
                       AND CAST(json_extract(body, '$.projectId') AS TEXT) = ?2",
                    params![child.as_str(), id.as_str()],
                )?;
                if removed > 0 {
                    tracing::debug!(project_id = %id, collection = %child, removed, "cascaded delete");
                }
            }
        }

        tx.commit()?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record_id(map: &Map<String, Value>) -> Result<String> {
    map.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::InvalidRecord("record has no id".into()))
}

/// Uniqueness violations become [`StoreError::Conflict`].
fn map_write_error(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict(msg.unwrap_or_else(|| err.to_string()))
        }
        other => StoreError::Sqlite(other),
    }
}
