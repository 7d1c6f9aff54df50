//! TTL-bounded result cache
//!
//! This module memoizes finished fact sheets keyed by the normalized request
//! URL. Expired entries are never served: they are dropped lazily on lookup
//! and proactively by [`ResultCache::purge_expired`], which
//! [`spawn_sweeper`] runs on an interval.

mod entry;

pub use entry::CacheEntry;

use crate::page::PageData;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Cache counters and sizes at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: usize,
    pub approximate_value_bytes: usize,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// In-memory page cache with per-entry expiry
///
/// All state sits behind one mutex, so a reader sees either a whole entry or
/// none, and concurrent writers to the same key resolve last-write-wins.
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl ResultCache {
    /// Creates an empty cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // No operation leaves the map half-updated, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks up a page, counting a hit or a miss
    ///
    /// An expired entry counts as a miss and is removed.
    pub fn get(&self, key: &str) -> Option<Arc<PageData>> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let now = Instant::now();

        match state.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                tracing::trace!("Cache hit: {} ({}s old)", key, entry.age().as_secs());
                let value = Arc::clone(&entry.value);
                state.hits += 1;
                Some(value)
            }
            Some(_) => {
                state.entries.remove(key);
                state.misses += 1;
                tracing::debug!("Cache entry expired: {}", key);
                None
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Stores a page, replacing any previous entry for the key
    ///
    /// Returns the shared handle now held by the cache.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Arc<PageData>>) -> Arc<PageData> {
        let value = value.into();
        let entry = CacheEntry::new(Arc::clone(&value), self.ttl);
        self.lock().entries.insert(key.into(), entry);
        value
    }

    /// Removes a single key, returning whether it was present
    pub fn remove(&self, key: &str) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    /// Drops every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut state = self.lock();
        let now = Instant::now();
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - state.entries.len()
    }

    /// Returns counters and the size of the live entry set
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let now = Instant::now();
        let live = state.entries.values().filter(|e| !e.is_expired_at(now));

        let (entry_count, approximate_value_bytes) = live.fold((0, 0), |(count, bytes), e| {
            (count + 1, bytes + e.approximate_bytes)
        });

        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entry_count,
            approximate_value_bytes,
        }
    }

    /// Removes all entries and resets the hit/miss counters
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
    }
}

/// Periodically purges expired entries from a shared cache
///
/// The task holds only a weak reference and exits once the cache is dropped.
/// A zero `period` is raised to one millisecond.
pub fn spawn_sweeper(cache: &Arc<ResultCache>, period: Duration) -> JoinHandle<()> {
    let cache = Arc::downgrade(cache);
    let period = period.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let Some(cache) = cache.upgrade() else {
                break;
            };
            let purged = cache.purge_expired();
            if purged > 0 {
                tracing::debug!("Purged {} expired cache entries", purged);
            }
        }
    })
}
