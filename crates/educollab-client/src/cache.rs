//! Keyed query cache with observer-driven refetch.
//!
//! Each [`QueryKey`] maps to the last value fetched for it. Views
//! [`subscribe`](QueryCache::subscribe) to the keys they render; invalidating
//! an observed key queues it for exactly one refetch, however many times it
//! was invalidated. Unobserved keys are only marked stale and reload on
//! their next read.
//!
//! Every load takes a per-key sequence number. A response is applied only
//! when it is newer than the last applied one, so a slow response can never
//! overwrite a fresher one. A response dispatched before an invalidation is
//! still applied but stays stale.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::Result;
use crate::keys::QueryKey;

/// Source of truth for every query key.
#[async_trait]
pub trait QueryLoader: Send + Sync {
    async fn load(&self, key: &QueryKey) -> Result<Value>;
}

struct Entry {
    value: Option<Value>,
    /// Sequence number of the most recently dispatched load.
    dispatched: u64,
    /// Sequence number of the value currently held.
    applied: u64,
    /// Values loaded with a sequence number up to this one are stale.
    stale_through: u64,
    observers: usize,
    version: watch::Sender<u64>,
}

impl Entry {
    fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            value: None,
            dispatched: 0,
            applied: 0,
            stale_through: 0,
            observers: 0,
            version,
        }
    }

    fn is_fresh(&self) -> bool {
        self.value.is_some() && self.applied > self.stale_through
    }
}

#[derive(Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    pending: BTreeSet<QueryKey>,
}

#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Mutex<Inner>>,
    loader: Arc<dyn QueryLoader>,
}

impl QueryCache {
    pub fn new(loader: Arc<dyn QueryLoader>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            loader,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Cached value when fresh, otherwise a load.
    pub async fn fetch(&self, key: &QueryKey) -> Result<Value> {
        let cached = {
            let inner = self.lock();
            inner
                .entries
                .get(key)
                .filter(|e| e.is_fresh())
                .and_then(|e| e.value.clone())
        };
        match cached {
            Some(value) => Ok(value),
            None => self.load(key).await,
        }
    }

    /// [`fetch`](Self::fetch) decoded as `T`.
    pub async fn fetch_as<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<T> {
        Ok(serde_json::from_value(self.fetch(key).await?)?)
    }

    /// Last value held for `key`, fresh or not, without loading.
    pub fn peek(&self, key: &QueryKey) -> Option<Value> {
        self.lock().entries.get(key).and_then(|e| e.value.clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.lock().entries.get(key).map_or(true, |e| !e.is_fresh())
    }

    /// Load `key` unconditionally and return the newest applied value.
    pub async fn load(&self, key: &QueryKey) -> Result<Value> {
        let seq = self.begin(key);
        debug!(key = %key, seq, "loading query");
        let value = self.loader.load(key).await?;
        Ok(self.commit(key, seq, value))
    }

    pub(crate) fn begin(&self, key: &QueryKey) -> u64 {
        let mut inner = self.lock();
        let entry = inner.entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.dispatched += 1;
        entry.dispatched
    }

    pub(crate) fn commit(&self, key: &QueryKey, seq: u64, value: Value) -> Value {
        let mut inner = self.lock();
        let entry = inner.entries.entry(key.clone()).or_insert_with(Entry::new);

        if seq > entry.applied {
            entry.applied = seq;
            entry.value = Some(value.clone());
            entry.version.send_replace(seq);
            return value;
        }

        debug!(key = %key, seq, applied = entry.applied, "discarding out-of-order response");
        entry.value.clone().unwrap_or(value)
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register an observer of `key` until the returned handle is dropped.
    pub fn subscribe(&self, key: &QueryKey) -> Subscription {
        let mut inner = self.lock();
        let entry = inner.entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.observers += 1;
        Subscription {
            key: key.clone(),
            receiver: entry.version.subscribe(),
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn observers(&self, key: &QueryKey) -> usize {
        self.lock().entries.get(key).map_or(0, |e| e.observers)
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    /// Mark `key` stale. Returns `true` when this call queued a refetch.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let mut inner = self.lock();
        let Some(entry) = inner.entries.get_mut(key) else {
            return false;
        };
        entry.stale_through = entry.dispatched;
        if entry.observers == 0 {
            return false;
        }
        inner.pending.insert(key.clone())
    }

    /// Keys waiting for a refetch.
    pub fn pending(&self) -> Vec<QueryKey> {
        self.lock().pending.iter().cloned().collect()
    }

    /// Reload every queued key once. Returns how many loads succeeded.
    ///
    /// A failed refetch is logged and leaves the key stale.
    pub async fn refetch_pending(&self) -> usize {
        let keys = std::mem::take(&mut self.lock().pending);
        let mut refreshed = 0;
        for key in keys {
            if self.observers(&key) == 0 {
                continue;
            }
            match self.load(&key).await {
                Ok(_) => refreshed += 1,
                Err(e) => warn!(key = %key, error = %e, "refetch failed"),
            }
        }
        refreshed
    }

    /// Forget every cached value, e.g. after the session changes.
    pub fn clear(&self) {
        let mut inner = self.lock();
        for entry in inner.entries.values_mut() {
            entry.value = None;
            entry.stale_through = entry.dispatched;
        }
        inner.pending.clear();
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Observer handle returned by [`QueryCache::subscribe`].
pub struct Subscription {
    key: QueryKey,
    receiver: watch::Receiver<u64>,
    inner: Arc<Mutex<Inner>>,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Sequence number of the value last applied for the key.
    pub fn version(&self) -> u64 {
        *self.receiver.borrow()
    }

    /// Wait until a newer value is applied.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut inner = lock_inner(&self.inner);
        if let Some(entry) = inner.entries.get_mut(&self.key) {
            entry.observers = entry.observers.saturating_sub(1);
        }
    }
}
