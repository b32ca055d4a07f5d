//! Session tier: the same LRU+TTL shape as `critique-cache`'s in-memory
//! layer, reused rather than reimplemented since the two are structurally
//! identical.

use std::time::Duration;

use critique_cache::LruTtlCache;

use crate::model::MemoryItem;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct SessionMemory {
    cache: LruTtlCache<MemoryItem>,
    ttl_secs: u64,
}

impl SessionMemory {
    pub fn new(capacity: usize, ttl_secs: u64) -> Self {
        let cache = LruTtlCache::new(capacity);
        cache.spawn_sweeper(SWEEP_INTERVAL);
        Self { cache, ttl_secs }
    }

    pub async fn put(&self, item: MemoryItem) {
        self.cache.set(item.id.clone(), item, self.ttl_secs).await;
    }

    pub async fn get(&self, id: &str) -> Option<MemoryItem> {
        self.cache.get(id).await
    }

    pub async fn remove(&self, id: &str) {
        self.cache.delete(id).await;
    }

    pub async fn len(&self) -> usize {
        self.cache.len().await
    }

    pub async fn all(&self) -> Vec<MemoryItem> {
        self.cache.values().await
    }
}
