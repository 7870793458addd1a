//! Cache layer that orchestrates read-through caching with network fetching.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;

use super::storage::{MemoryStorage, NoopStorage};
use super::traits::{CacheResult, CacheStorage};

/// Read-through request cache.
///
/// Sits between the request client and the network. A fetch that began
/// before an invalidation may still store its (now stale) result after the
/// invalidation returns; callers that need a fresh read must invalidate
/// after their own writes complete.
pub struct RequestCache {
  storage: Arc<dyn CacheStorage>,
}

impl RequestCache {
  /// Create a new cache over the given storage backend.
  pub fn new<S: CacheStorage + 'static>(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// A per-instance in-memory cache.
  pub fn in_memory() -> Self {
    Self::new(MemoryStorage::new())
  }

  /// A cache that never stores anything.
  pub fn disabled() -> Self {
    Self::new(NoopStorage)
  }

  /// Return the cached body for `key`, or run `fetcher` and store its result.
  ///
  /// Failed fetches are never stored.
  pub async fn fetch<F, Fut>(&self, key: &str, fetcher: F) -> Result<CacheResult<Value>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
  {
    if let Some(cached) = self.storage.get(key) {
      debug!(key, cached_at = %cached.cached_at, "cache hit");
      return Ok(CacheResult::from_cache(cached.value, cached.cached_at));
    }

    let data = fetcher().await?;
    self.storage.put(key, data.clone());
    Ok(CacheResult::from_network(data))
  }

  /// Drop every entry whose key starts with `prefix`.
  pub fn invalidate_prefix(&self, prefix: &str) -> usize {
    let removed = self.storage.remove_prefix(prefix);
    debug!(prefix, removed, "cache invalidated");
    removed
  }

  pub fn contains(&self, key: &str) -> bool {
    self.storage.get(key).is_some()
  }

  pub fn len(&self) -> usize {
    self.storage.len()
  }

  pub fn is_empty(&self) -> bool {
    self.storage.is_empty()
  }
}

impl Default for RequestCache {
  fn default() -> Self {
    Self::in_memory()
  }
}

impl Clone for RequestCache {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}
