use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// (fingerprint, value, created-at, TTL). Generic over the cached value so
/// this crate has no dependency on what it's caching — the review engine
/// caches `ReviewResponse`s, but the cache itself only ever sees `T`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub fingerprint: String,
    pub value: T,
    pub created_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(fingerprint: impl Into<String>, value: T, ttl_secs: u64) -> Self {
        Self { fingerprint: fingerprint.into(), value, created_at: Utc::now(), ttl_secs }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at);
        age.num_seconds() >= self.ttl_secs as i64
    }
}
