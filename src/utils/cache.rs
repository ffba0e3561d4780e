use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    stats: CacheStats,
}

/// Keyed cache with a fixed time-to-live and a bounded entry count.
///
/// Expired entries are dropped lazily on access. When the cache is full the
/// oldest inserted entry is evicted.
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock().await;

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() >= self.ttl,
            None => {
                inner.stats.misses += 1;
                return None;
            }
        };

        if expired {
            inner.entries.remove(key);
            inner.stats.evictions += 1;
            inner.stats.misses += 1;
            tracing::debug!("Cache entry '{}' expired", key);
            return None;
        }

        inner.stats.hits += 1;
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut inner = self.inner.lock().await;

        let ttl = self.ttl;
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        let purged = (before - inner.entries.len()) as u64;
        inner.stats.evictions += purged;

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.max_entries {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
                inner.stats.evictions += 1;
                tracing::debug!("Cache full, evicted '{}'", oldest);
            }
        }

        inner.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.inner.lock().await.entries.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.entries.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        CacheStats {
            entries: inner.entries.len(),
            ..inner.stats
        }
    }
}
