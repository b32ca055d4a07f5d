//! LRU+TTL in-memory cache and content-addressed on-disk file cache.

pub mod errors;
pub mod file;
pub mod memory;
pub mod model;

pub use errors::{CacheError, CacheResult};
pub use file::FileCache;
pub use memory::LruTtlCache;
pub use model::CacheEntry;
