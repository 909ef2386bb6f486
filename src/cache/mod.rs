//! Cache-aside storage for encoded tiles and thumbnails.
//!
//! The engine checks this layer before touching a slide and populates it
//! after every regeneration; the cache is never the system of record.
//!
//! # Components
//!
//! - [`CacheKey`]: deterministic addressing for one encoded artifact
//! - [`CacheStore`]: the backend contract (get / put with TTL)
//! - [`MemoryCacheStore`]: in-process LRU reference backend

mod key;
mod store;

pub use key::CacheKey;
pub use store::{CacheStore, MemoryCacheStore, DEFAULT_CACHE_CAPACITY};
