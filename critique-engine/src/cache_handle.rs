//! Two-layer cache handle the engine checks before dispatching to a provider.
//!
//! LRU+TTL is checked first (cheap, in-memory); a miss falls through to the
//! content-addressed file cache before the engine gives up and calls the
//! provider. A file-cache hit is promoted back into the in-memory layer.

use critique_cache::{CacheEntry, FileCache, LruTtlCache};
use critique_providers::ReviewResponse;

use crate::config::CacheConfig;

#[derive(Clone)]
pub struct CacheHandle {
    memory: LruTtlCache<ReviewResponse>,
    file: FileCache,
    ttl_secs: u64,
    enabled: bool,
}

impl CacheHandle {
    pub fn new(config: &CacheConfig) -> Self {
        let memory = LruTtlCache::new(config.max_entries);
        memory.spawn_sweeper(std::time::Duration::from_secs(60));
        Self { memory, file: FileCache::new(&config.dir), ttl_secs: config.ttl_secs, enabled: config.enabled }
    }

    pub async fn get(&self, fingerprint: &str) -> Option<ReviewResponse> {
        if !self.enabled {
            return None;
        }
        if let Some(value) = self.memory.get(fingerprint).await {
            return Some(value);
        }
        match self.file.load::<ReviewResponse>(fingerprint).await {
            Ok(Some(entry)) if !entry.is_expired(chrono::Utc::now()) => {
                self.memory.set(fingerprint.to_string(), entry.value.clone(), self.ttl_secs).await;
                Some(entry.value)
            }
            _ => None,
        }
    }

    pub async fn set(&self, fingerprint: &str, value: ReviewResponse) {
        if !self.enabled {
            return;
        }
        self.memory.set(fingerprint.to_string(), value.clone(), self.ttl_secs).await;
        let entry = CacheEntry::new(fingerprint.to_string(), value, self.ttl_secs);
        if let Err(err) = self.file.save(&entry).await {
            tracing::warn!(%err, "cache: file write-back failed, continuing without it");
        }
    }
}
