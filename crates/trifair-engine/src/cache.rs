// Path: crates/trifair-engine/src/cache.rs
//! C9: a thin key/value façade with TTL, backed in-process by default.
//!
//! No strong consistency is assumed here (§4.9): callers must treat a miss
//! as recoverable by falling back to the session store, never as proof that
//! the key never existed.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

/// The external key/value interface the engine depends on (§4.9, §6).
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);
    async fn del(&self, key: &str);
    /// Increments the integer stored at `key` (creating it at 0 first) and
    /// returns the new value.
    async fn incr(&self, key: &str) -> i64;
    /// Applies a new TTL to an existing key. A no-op if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration);
}

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

/// In-process map honoring TTL via lazy expiry on read (§4.9 default
/// implementation). A remote implementation (e.g. Redis) can substitute
/// without changing any caller by implementing the same trait.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, Entry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired(now) {
                drop(entry);
                self.entries.remove(key);
                return None;
            }
            return Some(entry.value.clone());
        }
        None
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        let expires_at = ttl.map(|d| Instant::now() + d);
        self.entries.insert(key.to_string(), Entry { value, expires_at });
    }

    async fn del(&self, key: &str) {
        self.entries.remove(key);
    }

    async fn incr(&self, key: &str) -> i64 {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: 0i64.to_le_bytes().to_vec(),
            expires_at: None,
        });
        if entry.is_expired(now) {
            entry.value = 0i64.to_le_bytes().to_vec();
            entry.expires_at = None;
        }
        let bytes: [u8; 8] = entry.value.as_slice().try_into().unwrap_or([0u8; 8]);
        let current = i64::from_le_bytes(bytes);
        let next = current + 1;
        entry.value = next.to_le_bytes().to_vec();
        next
    }

    async fn expire(&self, key: &str, ttl: Duration) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = InMemoryCache::new();
        cache.set("k", b"v".to_vec(), None).await;
        assert_eq!(cache.get("k").await, Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.get("absent").await, None);
    }

    #[tokio::test]
    async fn ttl_expires_lazily_on_read() {
        let cache = InMemoryCache::new();
        cache.set("k", b"v".to_vec(), Some(Duration::from_millis(1))).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn del_removes_the_key() {
        let cache = InMemoryCache::new();
        cache.set("k", b"v".to_vec(), None).await;
        cache.del("k").await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn incr_starts_at_one_and_counts_up() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.incr("counter").await, 1);
        assert_eq!(cache.incr("counter").await, 2);
        assert_eq!(cache.incr("counter").await, 3);
    }

    #[tokio::test]
    async fn expire_sets_a_ttl_on_an_existing_key() {
        let cache = InMemoryCache::new();
        cache.set("k", b"v".to_vec(), None).await;
        cache.expire("k", Duration::from_millis(1)).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("k").await, None);
    }
}
