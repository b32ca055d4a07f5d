//! LRU + TTL in-memory cache layer.
//!
//! Wraps the `lru` crate's `LruCache` behind a single `tokio::sync::RwLock`
//! (one lock per structure, per the shared-resource policy). Unlike the
//! on-disk `FileCache`, which stamps entries with a wall-clock
//! `chrono::DateTime` so TTL survives a process restart, this tier never
//! outlives the process, so it tracks age with `tokio::time::Instant`
//! instead: that makes it advanceable under `tokio::time::pause()` in
//! tests, rather than needing a real sleep to observe expiry.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

struct Slot<T> {
    value: T,
    inserted_at: Instant,
    ttl: Duration,
}

impl<T> Slot<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

/// Bounded, TTL-aware in-memory cache. Cloning shares the same backing
/// store (it's an `Arc` handle), matching how the engine passes one
/// `CacheHandle` around by value.
#[derive(Clone)]
pub struct LruTtlCache<T> {
    inner: Arc<RwLock<LruCache<String, Slot<T>>>>,
}

impl<T> LruTtlCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries.max(1)).unwrap();
        Self { inner: Arc::new(RwLock::new(LruCache::new(cap))) }
    }

    /// Spawns a periodic sweep that evicts expired entries even if nobody
    /// reads them, matching the "removed lazily on access and by a periodic
    /// sweep" contract.
    pub fn spawn_sweeper(&self, interval: Duration) {
        let handle = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                handle.sweep_expired().await;
            }
        });
    }

    async fn sweep_expired(&self) {
        let now = Instant::now();
        let mut guard = self.inner.write().await;
        let expired: Vec<String> = guard.iter().filter(|(_, e)| e.is_expired(now)).map(|(k, _)| k.clone()).collect();
        for key in &expired {
            guard.pop(key);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "cache::sweep: evicted expired entries");
        }
    }

    /// Returns the cached value, or `None` on a miss. An expired entry is
    /// observed as a miss and evicted in the same call.
    pub async fn get(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let mut guard = self.inner.write().await;
        match guard.get(key) {
            Some(entry) if entry.is_expired(now) => {
                guard.pop(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: T, ttl_secs: u64) {
        let key = key.into();
        let slot = Slot { value, inserted_at: Instant::now(), ttl: Duration::from_secs(ttl_secs) };
        self.inner.write().await.put(key, slot);
    }

    pub async fn delete(&self, key: &str) {
        self.inner.write().await.pop(key);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Snapshot of all non-expired values currently held, most-recently-used
    /// first. Used by callers that need to rank/search across the whole
    /// tier rather than look up a single key.
    pub async fn values(&self) -> Vec<T> {
        let now = Instant::now();
        self.inner.read().await.iter().filter(|(_, e)| !e.is_expired(now)).map(|(_, e)| e.value.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_after_set_is_a_hit() {
        let cache: LruTtlCache<String> = LruTtlCache::new(10);
        cache.set("k", "v".to_string(), 60).await;
        assert_eq!(cache.get("k").await, Some("v".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_observed_as_miss() {
        let cache: LruTtlCache<String> = LruTtlCache::new(10);
        cache.set("k", "v".to_string(), 0).await;
        tokio::time::advance(Duration::from_millis(1100)).await;
        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn values_excludes_expired_entries() {
        let cache: LruTtlCache<i32> = LruTtlCache::new(10);
        cache.set("a", 1, 60).await;
        cache.set("b", 2, 0).await;
        tokio::time::advance(Duration::from_millis(1100)).await;
        assert_eq!(cache.values().await, vec![1]);
    }

    #[tokio::test]
    async fn strict_lru_eviction_under_capacity() {
        let cache: LruTtlCache<i32> = LruTtlCache::new(2);
        cache.set("a", 1, 60).await;
        cache.set("b", 2, 60).await;
        // touch "a" so "b" becomes the least-recently-used.
        let _ = cache.get("a").await;
        cache.set("c", 3, 60).await;
        assert_eq!(cache.get("b").await, None);
        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache: LruTtlCache<i32> = LruTtlCache::new(10);
        cache.set("a", 1, 60).await;
        cache.delete("a").await;
        assert_eq!(cache.get("a").await, None);
    }
}
