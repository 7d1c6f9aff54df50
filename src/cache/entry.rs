//! A single cached fact sheet

use crate::page::PageData;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cached page along with its expiry
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached fact sheet
    pub value: Arc<PageData>,

    /// When the entry was stored
    pub inserted_at: Instant,

    /// When the entry stops being served; `None` when the TTL runs past
    /// what `Instant` can represent
    pub expires_at: Option<Instant>,

    /// Serialized size of `value`, measured once at insertion
    pub approximate_bytes: usize,
}

impl CacheEntry {
    /// Creates an entry that expires `ttl` from now
    pub fn new(value: Arc<PageData>, ttl: Duration) -> Self {
        let inserted_at = Instant::now();
        let approximate_bytes = value.approximate_size();
        Self {
            value,
            inserted_at,
            expires_at: inserted_at.checked_add(ttl),
            approximate_bytes,
        }
    }

    /// Checks whether the entry has expired at the given instant
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    /// Returns how long ago the entry was stored
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }
}
