//! Core traits and types for the request cache.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A cached response body keyed by endpoint.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  /// Last successful response body, kept opaque
  pub value: Value,
  /// When the body was stored
  pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
  pub fn new(value: Value) -> Self {
    Self {
      value,
      cached_at: Utc::now(),
    }
  }
}

/// Trait for cache storage backends.
///
/// Entries never expire on their own; they leave the cache only through
/// `remove_prefix`.
pub trait CacheStorage: Send + Sync {
  /// Get the entry stored under `key`.
  fn get(&self, key: &str) -> Option<CacheEntry>;

  /// Store `value` under `key`, replacing any previous entry.
  fn put(&self, key: &str, value: Value);

  /// Remove every entry whose key starts with `prefix`. Returns how many were removed.
  fn remove_prefix(&self, prefix: &str) -> usize;

  /// Number of entries currently held.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Result from a cache operation, including data and where it came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from the network
  Network,
  /// Served from the cache without a network call
  Cache,
}
