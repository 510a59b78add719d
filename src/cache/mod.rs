// Cache seam with "failure is a miss" semantics.
//
// Every consumer must recompute on a miss, so a cache-layer outage can
// only cost latency, never correctness. The trait therefore exposes no
// error channel at all: implementations swallow and log their own
// failures.

pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

pub use memory::InMemoryCache;

/// Advisory key/value cache. A `None` from `get_raw` means "recompute";
/// implementations must map their internal failures to that, never panic
/// or surface errors.
#[async_trait]
pub trait MedicalCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> Option<String>;

    async fn set_raw(&self, key: &str, value: String, ttl: Duration);

    async fn invalidate(&self, key: &str);
}

/// Deterministic cache key from (namespace, player/injury id, params).
pub fn cache_key(namespace: &str, id: Uuid, params: &[&str]) -> String {
    let mut key = format!("med:{namespace}:{id}");
    for param in params {
        key.push(':');
        key.push_str(param);
    }
    key
}

/// Typed read; deserialization failures count as misses.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn MedicalCache, key: &str) -> Option<T> {
    let raw = cache.get_raw(key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding undeserializable cache entry {}: {}", key, e);
            cache.invalidate(key).await;
            None
        }
    }
}

/// Typed write; serialization failures are logged and dropped.
pub async fn set_json<T: Serialize>(cache: &dyn MedicalCache, key: &str, value: &T, ttl: Duration) {
    match serde_json::to_string(value) {
        Ok(raw) => cache.set_raw(key, raw, ttl).await,
        Err(e) => warn!("Failed to serialize cache entry {}: {}", key, e),
    }
}
