//! Config snapshot cache.
//!
//! Entries are immutable `Arc`s: readers clone the pointer and drop the lock
//! straight away, writers replace a key with a single insert. A reader racing
//! a reload may see the previous snapshot.

use super::loader::ConfigSnapshot;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Trait for caching config snapshots.
///
/// Implementations should be thread-safe (Send + Sync).
pub trait ConfigCache: Send + Sync + std::fmt::Debug {
    /// Look up a snapshot by key.
    ///
    /// Returns None if not cached or if the entry is stale.
    fn get(&self, key: &Path) -> Option<Arc<ConfigSnapshot>>;

    /// Store a snapshot, replacing any entry under the same key.
    fn put(&self, key: PathBuf, snapshot: Arc<ConfigSnapshot>);
}

#[derive(Debug)]
struct CacheEntry {
    snapshot: Arc<ConfigSnapshot>,
    created: Instant,
}

/// Time-based cache: entries older than the TTL are never returned.
#[derive(Debug)]
pub struct TtlConfigCache {
    ttl: Duration,
    entries: RwLock<HashMap<PathBuf, Arc<CacheEntry>>>,
}

impl TtlConfigCache {
    /// Create an empty cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConfigCache for TtlConfigCache {
    fn get(&self, key: &Path) -> Option<Arc<ConfigSnapshot>> {
        let entry = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()?;

        if entry.created.elapsed() < self.ttl {
            Some(Arc::clone(&entry.snapshot))
        } else {
            None
        }
    }

    fn put(&self, key: PathBuf, snapshot: Arc<ConfigSnapshot>) {
        let entry = Arc::new(CacheEntry {
            snapshot,
            created: Instant::now(),
        });
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }
}

/// No-op cache implementation (always misses, never stores).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConfigCache;

impl ConfigCache for NoConfigCache {
    fn get(&self, _key: &Path) -> Option<Arc<ConfigSnapshot>> {
        None
    }

    fn put(&self, _key: PathBuf, _snapshot: Arc<ConfigSnapshot>) {
        // No-op
    }
}
