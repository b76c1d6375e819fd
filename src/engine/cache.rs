//! Bounded, time-expiring response cache keyed by normalized message text.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::engine::core::config::CacheConfig;
use crate::engine::core::response::CoachResponse;
use crate::engine::core::text::normalize_message;

/// Cache entry with its creation instant.
#[derive(Clone)]
struct CacheEntry {
    response: CoachResponse,
    created_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) < ttl
    }
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order; overwrites keep their original slot.
    order: VecDeque<String>,
}

/// Thread-safe response cache.
///
/// Expired entries read as misses but stay resident until they are evicted.
/// Eviction is by insertion order, independent of TTL and access recency.
pub struct ResponseCache {
    config: CacheConfig,
    inner: Mutex<CacheInner>,
}

impl ResponseCache {
    /// Create a new cache with the given configuration.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Get a fresh cached response.
    #[must_use]
    pub fn get(&self, message: &str) -> Option<CoachResponse> {
        self.get_at(message, Instant::now())
    }

    /// Get a cached response as seen at `now`.
    #[must_use]
    pub fn get_at(&self, message: &str, now: Instant) -> Option<CoachResponse> {
        if !self.config.enabled {
            return None;
        }

        let key = normalize_message(message);
        let inner = self.lock();
        inner
            .entries
            .get(&key)
            .filter(|entry| entry.is_fresh(self.config.ttl(), now))
            .map(|entry| entry.response.clone())
    }

    /// Cache a response.
    pub fn put(&self, message: &str, response: &CoachResponse) {
        self.put_at(message, response, Instant::now());
    }

    /// Cache a response created at `now`.
    pub fn put_at(&self, message: &str, response: &CoachResponse, now: Instant) {
        if !self.config.enabled {
            return;
        }

        let key = normalize_message(message);
        if key.is_empty() {
            return;
        }

        let entry = CacheEntry {
            response: response.clone(),
            created_at: now,
        };

        let mut inner = self.lock();
        if inner.entries.insert(key.clone(), entry).is_none() {
            inner.order.push_back(key);
        }

        while inner.entries.len() > self.config.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
        }
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Number of resident entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached responses hold no invariants a panicking writer could break.
    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
