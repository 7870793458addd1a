//! Request cache for GET responses.
//!
//! This module provides a per-client caching mechanism that:
//! - Keys response bodies by endpoint path
//! - Keeps entries until they are explicitly invalidated
//! - Invalidates by key prefix (the resource segment of a mutated endpoint)

mod layer;
mod storage;
mod traits;

pub use layer::RequestCache;
pub use storage::{MemoryStorage, NoopStorage};
pub use traits::{CacheEntry, CacheResult, CacheSource, CacheStorage};
