//! The generic resource-collection interface and its typed wrapper.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use educollab_shared::{Collection, EntityId};

use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

impl FilterValue {
    /// Wire form used in query strings.
    pub fn to_query_value(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<&EntityId> for FilterValue {
    fn from(id: &EntityId) -> Self {
        FilterValue::Text(id.as_str().to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Equality filter over top-level record fields, with optional sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub conditions: Vec<(String, FilterValue)>,
    pub sort: Option<(String, SortOrder)>,
}

impl Filter {
    /// Match every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.conditions.push((field.to_string(), value.into()));
        self
    }

    pub fn sort_by(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = Some((field.to_string(), order));
        self
    }

    /// Query-string pairs in json-server syntax.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .conditions
            .iter()
            .map(|(field, value)| (field.clone(), value.to_query_value()))
            .collect();
        if let Some((field, order)) = &self.sort {
            pairs.push(("_sort".to_string(), field.clone()));
            pairs.push(("_order".to_string(), order.as_str().to_string()));
        }
        pairs
    }

    /// Every field name is a plain identifier.
    pub fn validate(&self) -> Result<()> {
        let fields = self
            .conditions
            .iter()
            .map(|(f, _)| f)
            .chain(self.sort.iter().map(|(f, _)| f));
        for field in fields {
            if !is_valid_field(field) {
                return Err(StoreError::InvalidRecord(format!(
                    "invalid filter field '{field}'"
                )));
            }
        }
        Ok(())
    }
}

/// ASCII letters, digits and underscores, not starting with a digit.
pub fn is_valid_field(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

/// Rewrite numeric identifier fields (`id`, `*Id`) to their string form and
/// assign a fresh `id` when the record has none.
pub fn canonicalize_record(mut record: Value) -> Result<Map<String, Value>> {
    let Some(map) = record.as_object_mut() else {
        return Err(StoreError::InvalidRecord("record is not a JSON object".into()));
    };

    for (key, value) in map.iter_mut() {
        if (key == "id" || key.ends_with("Id")) && value.is_number() {
            *value = Value::String(value.to_string());
        }
    }

    match map.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(Value::Null) | None => {
            map.insert("id".into(), Value::String(EntityId::new().into_string()));
        }
        Some(Value::String(_)) => {
            map.insert("id".into(), Value::String(EntityId::new().into_string()));
        }
        Some(other) => {
            return Err(StoreError::InvalidRecord(format!("unusable id {other}")));
        }
    }

    Ok(std::mem::take(map))
}

// ---------------------------------------------------------------------------
// Store interface
// ---------------------------------------------------------------------------

/// Generic CRUD over named collections.
///
/// Records travel as JSON objects. `update` applies a shallow merge patch and
/// returns the full updated record.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn list(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>>;

    async fn get(&self, collection: Collection, id: &EntityId) -> Result<Value>;

    async fn create(&self, collection: Collection, record: Value) -> Result<Value>;

    async fn update(&self, collection: Collection, id: &EntityId, patch: Value) -> Result<Value>;

    async fn delete(&self, collection: Collection, id: &EntityId) -> Result<()>;
}

/// A model stored in one collection.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn id(&self) -> &EntityId;
}

/// Typed access to a [`ResourceStore`].
#[derive(Clone)]
pub struct ResourceClient {
    store: Arc<dyn ResourceStore>,
}

impl ResourceClient {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ResourceStore> {
        &self.store
    }

    /// List records matching `filter`.
    ///
    /// Records that do not decode as `T` are skipped with a warning so one
    /// malformed row never hides the rest of a collection.
    pub async fn list<T: Resource>(&self, filter: &Filter) -> Result<Vec<T>> {
        let raw = self.store.list(T::COLLECTION, filter).await?;
        let mut records = Vec::with_capacity(raw.len());
        for value in raw {
            match serde_json::from_value::<T>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(collection = %T::COLLECTION, error = %e, "skipping malformed record");
                }
            }
        }
        Ok(records)
    }

    /// First record matching `filter`, if any.
    pub async fn find_one<T: Resource>(&self, filter: &Filter) -> Result<Option<T>> {
        Ok(self.list::<T>(filter).await?.into_iter().next())
    }

    pub async fn get<T: Resource>(&self, id: &EntityId) -> Result<T> {
        let value = self.store.get(T::COLLECTION, id).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn create<T: Resource>(&self, record: &T) -> Result<T> {
        let value = serde_json::to_value(record)?;
        let created = self.store.create(T::COLLECTION, value).await?;
        Ok(serde_json::from_value(created)?)
    }

    pub async fn update<T: Resource>(&self, id: &EntityId, patch: Value) -> Result<T> {
        let updated = self.store.update(T::COLLECTION, id, patch).await?;
        Ok(serde_json::from_value(updated)?)
    }

    pub async fn delete<T: Resource>(&self, id: &EntityId) -> Result<()> {
        self.store.delete(T::COLLECTION, id).await
    }
}
