use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::MedicalCache;

/// In-memory cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry {
    data: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory TTL cache. Expired entries are dropped lazily on read and by
/// [`InMemoryCache::cleanup`].
#[derive(Clone, Default)]
pub struct InMemoryCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry.
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        store.retain(|_, entry| !entry.is_expired());
    }

    /// (total, expired) entry counts.
    pub async fn stats(&self) -> (usize, usize) {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();
        (total, expired)
    }
}

#[async_trait]
impl MedicalCache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        store
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.data.clone())
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) {
        let mut store = self.store.write().await;
        store.insert(
            key.to_string(),
            CacheEntry {
                data: value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn invalidate(&self, key: &str) {
        let mut store = self.store.write().await;
        store.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let cache = InMemoryCache::new();
        cache
            .set_raw("k", "v".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get_raw("k").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = InMemoryCache::new();
        cache
            .set_raw("k", "v".to_string(), Duration::from_millis(0))
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.get_raw("k").await, None);

        cache.cleanup().await;
        let (total, _) = cache.stats().await;
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = InMemoryCache::new();
        cache
            .set_raw("k", "v".to_string(), Duration::from_secs(60))
            .await;
        cache.invalidate("k").await;
        assert_eq!(cache.get_raw("k").await, None);
    }
}
