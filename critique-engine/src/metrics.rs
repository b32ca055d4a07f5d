//! In-process counters/gauges/histogram for observability.
//!
//! No external metrics crate is pulled in — none of the pack's examples
//! depend on `metrics`/`prometheus`, and only in-process counters are
//! required here, not an external sink.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Histogram {
    buckets_ms: [AtomicU64; 8],
}

const BUCKET_BOUNDS_MS: [u64; 8] = [10, 50, 100, 250, 500, 1_000, 5_000, u64::MAX];

impl Histogram {
    pub fn record(&self, value_ms: u64) {
        for (i, bound) in BUCKET_BOUNDS_MS.iter().enumerate() {
            if value_ms <= *bound {
                self.buckets_ms[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
    }

    pub fn counts(&self) -> [u64; 8] {
        let mut out = [0u64; 8];
        for (i, b) in self.buckets_ms.iter().enumerate() {
            out[i] = b.load(Ordering::Relaxed);
        }
        out
    }
}

#[derive(Default)]
pub struct Metrics {
    pub reviews_total: AtomicU64,
    pub provider_calls_total: AtomicU64,
    pub provider_errors_total: AtomicU64,
    pub cache_hits_total: AtomicU64,
    pub cache_misses_total: AtomicU64,
    pub worker_pool_queue_depth: AtomicU64,
    pub worker_pool_active: AtomicU64,
    pub provider_latency_ms: Histogram,
    pub review_duration_ms: Histogram,
}

impl Metrics {
    pub fn record_provider_call(&self, latency_ms: u64, ok: bool) {
        self.provider_calls_total.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.provider_errors_total.fetch_add(1, Ordering::Relaxed);
        }
        self.provider_latency_ms.record(latency_ms);
    }

    pub fn record_cache_lookup(&self, hit: bool) {
        if hit {
            self.cache_hits_total.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses_total.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_buckets_cumulatively_by_first_matching_bound() {
        let h = Histogram::default();
        h.record(5);
        h.record(80);
        h.record(10_000);
        let counts = h.counts();
        assert_eq!(counts[0], 1);
        assert_eq!(counts[2], 1);
        assert_eq!(counts[7], 1);
    }

    #[test]
    fn metrics_track_cache_hit_ratio() {
        let m = Metrics::default();
        m.record_cache_lookup(true);
        m.record_cache_lookup(true);
        m.record_cache_lookup(false);
        assert_eq!(m.cache_hits_total.load(Ordering::Relaxed), 2);
        assert_eq!(m.cache_misses_total.load(Ordering::Relaxed), 1);
    }
}
