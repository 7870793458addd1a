//! Cache storage implementations.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::traits::{CacheEntry, CacheStorage};

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Option<CacheEntry> {
    None // Always miss
  }

  fn put(&self, _key: &str, _value: Value) {
    // Discard
  }

  fn remove_prefix(&self, _prefix: &str) -> usize {
    0
  }

  fn len(&self) -> usize {
    0
  }
}

/// In-memory storage owned by a single client instance.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  // Every mutation is a single map call, so a poisoned map is still consistent.
  fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
    self
      .entries
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Option<CacheEntry> {
    self.entries().get(key).cloned()
  }

  fn put(&self, key: &str, value: Value) {
    self
      .entries()
      .insert(key.to_string(), CacheEntry::new(value));
  }

  fn remove_prefix(&self, prefix: &str) -> usize {
    let mut entries = self.entries();
    let before = entries.len();
    entries.retain(|key, _| !key.starts_with(prefix));
    before - entries.len()
  }

  fn len(&self) -> usize {
    self.entries().len()
  }
}
