//! In-process cache with per-key expiry.
//!
//! Expiry is lazy: a stale entry is dropped by the `get` that notices it. There is no
//! background sweeper and no size bound.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Returns the value for `key` if it has not expired yet.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.get(key)?;
        if now < entry.expires_at {
            return Some(entry.value.clone());
        }

        entries.remove(key);
        tracing::debug!(key, "cache entry expired");
        None
    }

    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .await
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Number of stored entries, including expired ones not yet observed by `get`.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
