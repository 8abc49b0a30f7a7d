//! In-memory revalidating cache
//!
//! Values are served from memory until they are older than the
//! revalidation window, then fetched again on next access. When a refresh
//! fails and a previous value exists, the previous value keeps being served.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry<V> {
    value: V,
    fetched_at: Instant,
}

pub struct RevalidatingCache<K, V> {
    window: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> RevalidatingCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh cached value for `key`, if any
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.fetched_at.elapsed() < self.window)
            .map(|e| e.value.clone())
    }

    /// Cached value, or the result of `fetch` once the entry is stale
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        match fetch().await {
            Ok(value) => {
                self.insert(key, value.clone()).await;
                Ok(value)
            }
            Err(e) => {
                let entries = self.entries.read().await;
                match entries.get(&key) {
                    Some(stale) => {
                        tracing::warn!("Refresh failed, serving stale value: {}", e);
                        Ok(stale.value.clone())
                    }
                    None => Err(e),
                }
            }
        }
    }

    pub async fn insert(&self, key: K, value: V) {
        self.entries.write().await.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
