//! [`ResourceStore`] client for a json-server style REST backend.
//!
//! Collections map to `/{collection}` and records to `/{collection}/{id}`.
//! Timeouts come from the `reqwest` client; no retries are attempted here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use educollab_shared::{Collection, EntityId};

use crate::error::{Result, StoreError};
use crate::resource::{Filter, ResourceStore};

#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.as_str())
    }

    fn record_url(&self, collection: Collection, id: &EntityId) -> String {
        format!("{}/{}/{}", self.base_url, collection.as_str(), id)
    }
}

/// Map non-success statuses to store errors.
async fn check(resp: Response, collection: Collection, id: Option<&EntityId>) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(StoreError::NotFound {
            collection,
            id: id.clone(),
        }),
        (StatusCode::CONFLICT, _) => Err(StoreError::Conflict(body)),
        _ => Err(StoreError::Status {
            status: status.as_u16(),
            body,
        }),
    }
}

#[async_trait]
impl ResourceStore for HttpStore {
    async fn list(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>> {
        filter.validate()?;
        let resp = self
            .client
            .get(self.collection_url(collection))
            .query(&filter.to_query_pairs())
            .send()
            .await?;
        let resp = check(resp, collection, None).await?;
        Ok(resp.json().await?)
    }

    async fn get(&self, collection: Collection, id: &EntityId) -> Result<Value> {
        let resp = self.client.get(self.record_url(collection, id)).send().await?;
        let resp = check(resp, collection, Some(id)).await?;
        Ok(resp.json().await?)
    }

    async fn create(&self, collection: Collection, record: Value) -> Result<Value> {
        let resp = self
            .client
            .post(self.collection_url(collection))
            .json(&record)
            .send()
            .await?;
        let resp = check(resp, collection, None).await?;
        Ok(resp.json().await?)
    }

    async fn update(&self, collection: Collection, id: &EntityId, patch: Value) -> Result<Value> {
        let resp = self
            .client
            .patch(self.record_url(collection, id))
            .json(&patch)
            .send()
            .await?;
        let resp = check(resp, collection, Some(id)).await?;
        Ok(resp.json().await?)
    }

    async fn delete(&self, collection: Collection, id: &EntityId) -> Result<()> {
        let resp = self
            .client
            .delete(self.record_url(collection, id))
            .send()
            .await?;
        check(resp, collection, Some(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_base() {
        let store = HttpStore::new("http://localhost:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(store.base_url(), "http://localhost:3001");
        assert_eq!(
            store.collection_url(Collection::TeamMembers),
            "http://localhost:3001/team-members"
        );
        assert_eq!(
            store.record_url(Collection::Projects, &EntityId::from(4u64)),
            "http://localhost:3001/projects/4"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_http_error() {
        // Port 9 (discard) on localhost is essentially never listening.
        let store = HttpStore::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = store
            .list(Collection::Projects, &Filter::all())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Http(_)));
    }
}
