//! Expiring key/value store with capacity-bounded lazy eviction.
//!
//! Keys are deterministic strings composed from the operation name and its
//! normalized arguments; values are whatever the owning store caches.
//! Expiry is checked on read, and capacity is enforced lazily on the write
//! path: a write that pushes the store above its high-water mark first
//! purges expired entries, then evicts the soonest-expiring entries until
//! the store is back at its low-water mark. Expiry time stands in for "will
//! be needed soon", so this approximates LRU without touch bookkeeping.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use marketdesk_core::config::CachePolicy;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe expiring map. Cloning values out keeps lock hold times short.
pub struct TtlCache<V> {
    inner: Mutex<HashMap<String, Entry<V>>>,
    high_water: usize,
    low_water: usize,
}

impl<V: Clone> TtlCache<V> {
    /// Create a store with the given capacity bounds.
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        // A low mark at or above the high mark would make eviction a no-op.
        let high_water = policy.high_water.max(1);
        let low_water = policy.low_water.min(high_water.saturating_sub(1)).max(1);
        Self {
            inner: Mutex::new(HashMap::new()),
            high_water,
            low_water,
        }
    }

    /// Return the stored value if present and un-expired. An expired entry
    /// is removed as a side effect and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(Instant::now(), key)
    }

    fn get_at(&self, now: Instant, key: &str) -> Option<V> {
        let mut guard = self.inner.lock().expect("mutex poisoned");
        match guard.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                guard.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value with `expires_at = now + ttl`, overwriting any prior
    /// entry for the key, then enforce the capacity bounds.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        self.set_at(Instant::now(), key, value, ttl);
    }

    fn set_at(&self, now: Instant, key: &str, value: V, ttl: Duration) {
        let mut guard = self.inner.lock().expect("mutex poisoned");
        guard.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );

        if guard.len() > self.high_water {
            guard.retain(|_, entry| now < entry.expires_at);

            if guard.len() > self.low_water {
                let mut by_expiry: Vec<(String, Instant)> = guard
                    .iter()
                    .map(|(k, e)| (k.clone(), e.expires_at))
                    .collect();
                by_expiry.sort_by_key(|&(_, expires_at)| expires_at);
                let excess = guard.len() - self.low_water;
                for (k, _) in by_expiry.into_iter().take(excess) {
                    guard.remove(&k);
                }
            }
        }
    }

    /// Get-or-compute-and-store. A producer failure propagates unchanged and
    /// caches nothing (errors are never negatively cached).
    pub async fn cached<F, Fut, E>(&self, key: &str, ttl: Duration, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let value = producer().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Current entry count, expired entries included until they are touched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("mutex poisoned").len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy(high: usize, low: usize) -> CachePolicy {
        CachePolicy {
            high_water: high,
            low_water: low,
        }
    }

    #[test]
    fn value_is_served_until_expiry_and_absent_after() {
        let cache = TtlCache::new(CachePolicy::default());
        let t0 = Instant::now();
        let ttl = Duration::from_secs(60);
        cache.set_at(t0, "quote:AAPL", 150.25_f64, ttl);

        assert_eq!(cache.get_at(t0 + Duration::from_secs(59), "quote:AAPL"), Some(150.25));
        // The expiry boundary itself reads as absent and removes the entry.
        assert_eq!(cache.get_at(t0 + ttl, "quote:AAPL"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn overwrite_replaces_value_and_ttl() {
        let cache = TtlCache::new(CachePolicy::default());
        let t0 = Instant::now();
        cache.set_at(t0, "k", 1_u32, Duration::from_secs(10));
        cache.set_at(t0, "k", 2_u32, Duration::from_secs(100));
        assert_eq!(cache.get_at(t0 + Duration::from_secs(50), "k"), Some(2));
    }

    #[test]
    fn eviction_purges_expired_first_then_soonest_expiring() {
        let cache = TtlCache::new(policy(10, 5));
        let t0 = Instant::now();
        // 6 already-expired entries plus 4 live ones fill the store.
        for i in 0..6 {
            cache.set_at(t0, &format!("dead:{i}"), i, Duration::from_secs(1));
        }
        let later = t0 + Duration::from_secs(2);
        for i in 0..4 {
            cache.set_at(later, &format!("live:{i}"), i, Duration::from_secs(100 + i as u64));
        }
        assert_eq!(cache.len(), 10);

        // The 11th write crosses the high-water mark; the expired six go
        // first, leaving 5 live entries, already at the low mark.
        cache.set_at(later, "live:4", 4, Duration::from_secs(200));
        assert_eq!(cache.len(), 5);
        for i in 0..4 {
            assert!(cache.get_at(later, &format!("live:{i}")).is_some());
        }
    }

    #[test]
    fn eviction_falls_back_to_expiry_order_when_nothing_expired() {
        let cache = TtlCache::new(policy(4, 2));
        let t0 = Instant::now();
        for i in 0..4 {
            // Entry i expires at t0 + 10 + i seconds.
            cache.set_at(t0, &format!("k:{i}"), i, Duration::from_secs(10 + i as u64));
        }
        cache.set_at(t0, "k:4", 4, Duration::from_secs(30));
        // Down to the low mark; the two soonest-expiring entries are gone.
        assert_eq!(cache.len(), 2);
        assert!(cache.get_at(t0, "k:0").is_none());
        assert!(cache.get_at(t0, "k:1").is_none());
        assert!(cache.get_at(t0, "k:2").is_none());
        assert!(cache.get_at(t0, "k:3").is_some());
        assert!(cache.get_at(t0, "k:4").is_some());
    }

    #[tokio::test]
    async fn cached_returns_hit_without_invoking_producer() {
        let cache = TtlCache::new(CachePolicy::default());
        cache.set("k", 7_u32, Duration::from_secs(60));
        let out: Result<u32, &str> = cache
            .cached("k", Duration::from_secs(60), || async { panic!("must not run") })
            .await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn cached_propagates_producer_error_and_caches_nothing() {
        let cache: TtlCache<u32> = TtlCache::new(CachePolicy::default());
        let out = cache
            .cached("k", Duration::from_secs(60), || async { Err::<u32, _>("boom") })
            .await;
        assert_eq!(out, Err("boom"));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn cached_stores_the_produced_value() {
        let cache = TtlCache::new(CachePolicy::default());
        let out: Result<u32, &str> = cache
            .cached("k", Duration::from_secs(60), || async { Ok(3) })
            .await;
        assert_eq!(out, Ok(3));
        assert_eq!(cache.get("k"), Some(3));
    }

    proptest! {
        #[test]
        fn entry_count_never_exceeds_high_water(writes in 1usize..500) {
            let cache = TtlCache::new(policy(50, 30));
            let t0 = Instant::now();
            for i in 0..writes {
                cache.set_at(t0, &format!("k:{i}"), i, Duration::from_secs(60 + i as u64));
                prop_assert!(cache.len() <= 50);
            }
        }
    }
}
