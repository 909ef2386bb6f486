//! Cache backend contract and the in-memory reference store.
//!
//! The engine never depends on a cache working: a failed lookup counts as a
//! miss and a failed store still lets the freshly generated bytes reach the
//! caller. The in-memory store bounds itself both by entry count and by
//! total byte size, evicting least-recently-used entries past capacity.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;

use crate::cache::CacheKey;
use crate::error::CacheError;

/// Default in-memory capacity: 100MB
pub const DEFAULT_CACHE_CAPACITY: usize = 100 * 1024 * 1024;

/// Cap on entry count, keeping LRU bookkeeping bounded
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Key/value store with TTL expiry backing the cache-aside engine.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a stored artifact. `Ok(None)` is a miss.
    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, CacheError>;

    /// Store an artifact, to be served for at most `ttl`.
    async fn put(&self, key: &CacheKey, data: Bytes, ttl: Duration) -> Result<(), CacheError>;
}

struct Entry {
    data: Bytes,
    expires_at: Instant,
}

/// In-memory LRU store with per-entry TTL and size-based eviction.
///
/// # Thread Safety
///
/// Safe to share across async tasks via `Arc`.
pub struct MemoryCacheStore {
    /// Entries in recency order, each with its expiry
    cache: RwLock<LruCache<CacheKey, Entry>>,

    /// Byte budget across all entries
    max_size: usize,

    /// Bytes currently held
    current_size: RwLock<usize>,
}

impl MemoryCacheStore {
    /// Create a store with default capacity (100MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a store with the specified capacity in bytes.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a store with the specified capacity and maximum entry count.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        Self {
            cache: RwLock::new(LruCache::new(NonZeroUsize::new(max_entries).unwrap())),
            max_size,
            current_size: RwLock::new(0),
        }
    }

    /// Current number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.len()
    }

    pub async fn is_empty(&self) -> bool {
        let cache = self.cache.read().await;
        cache.is_empty()
    }

    /// Current total size of stored bytes.
    pub async fn size(&self) -> usize {
        let current_size = self.current_size.read().await;
        *current_size
    }

    /// Maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;
        cache.clear();
        *current_size = 0;
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, CacheError> {
        let now = Instant::now();
        let mut cache = self.cache.write().await;

        match cache.get(key) {
            None => return Ok(None),
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.data.clone())),
            Some(_) => {}
        }

        // Expired: evict so a later lookup cannot serve stale bytes
        if let Some(entry) = cache.pop(key) {
            let mut current_size = self.current_size.write().await;
            *current_size = current_size.saturating_sub(entry.data.len());
        }
        Ok(None)
    }

    async fn put(&self, key: &CacheKey, data: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let data_size = data.len();
        let entry = Entry {
            data,
            expires_at: Instant::now() + ttl,
        };

        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;

        // Replacing an entry releases the bytes it held
        if let Some(old) = cache.peek(key) {
            *current_size = current_size.saturating_sub(old.data.len());
        }

        cache.put(key.clone(), entry);
        *current_size += data_size;

        // Shed least-recently-used entries until the byte budget holds
        while *current_size > self.max_size {
            if let Some((_, evicted)) = cache.pop_lru() {
                *current_size = current_size.saturating_sub(evicted.data.len());
            } else {
                // Nothing left to evict
                break;
            }
        }

        Ok(())
    }
}
