//! Shared client state.
//!
//! [`Platform`] bundles the resource client, the query cache, the
//! invalidation coordinator, the session and notification fan-out. It is
//! cheap to clone; every clone shares the same cache and session. The
//! read accessors and mutation entry points live in [`crate::commands`].

use std::sync::Arc;

use tracing::info;

use educollab_store::{HttpStore, ResourceClient, ResourceStore, SqliteStore};

use crate::cache::QueryCache;
use crate::config::{Backend, ClientConfig};
use crate::error::{ClientError, Result};
use crate::fanout::{Fanout, FanoutOutcome};
use crate::invalidation::{Coordinator, Mutation};
use crate::queries::StoreLoader;
use crate::session::SessionContext;

#[derive(Clone)]
pub struct Platform {
    pub(crate) resources: ResourceClient,
    pub(crate) cache: QueryCache,
    pub(crate) coordinator: Coordinator,
    pub(crate) session: SessionContext,
    pub(crate) fanout: Fanout,
}

impl Platform {
    pub fn new(store: Arc<dyn ResourceStore>, session: SessionContext) -> Self {
        let resources = ResourceClient::new(store);
        let cache = QueryCache::new(Arc::new(StoreLoader::new(resources.clone())));
        Self {
            coordinator: Coordinator::new(cache.clone()),
            fanout: Fanout::new(resources.clone()),
            resources,
            cache,
            session,
        }
    }

    /// Open the configured backend and restore the persisted session.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let store: Arc<dyn ResourceStore> = match config.backend {
            Backend::Http => Arc::new(
                HttpStore::new(&config.api_url, config.request_timeout)
                    .map_err(ClientError::Network)?,
            ),
            Backend::Sqlite => {
                let path = config.database_path()?;
                if let Some(dir) = path.parent() {
                    std::fs::create_dir_all(dir)
                        .map_err(|e| ClientError::SessionStorage(e.to_string()))?;
                }
                Arc::new(SqliteStore::open_at(&path)?)
            }
        };
        info!(backend = ?config.backend, api_url = %config.api_url, "client initialised");
        Ok(Self::new(store, SessionContext::init(config.session_path()?)))
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn resources(&self) -> &ResourceClient {
        &self.resources
    }

    /// Invalidate after a confirmed write and refetch what is observed.
    pub(crate) async fn confirm(&self, mutation: Mutation) {
        self.coordinator.on_success(&mutation).await;
    }

    /// Refresh the recipient's inbox when a fan-out notification landed.
    pub(crate) async fn deliver(&self, outcome: &FanoutOutcome) {
        if let Some(notification) = outcome.delivered() {
            self.confirm(Mutation::NotificationCreated {
                user_id: notification.user_id.clone(),
            })
            .await;
        }
    }
}
