//! In-memory cache manager for API responses
//!
//! Provides a `CacheManager` that stores parsed JSON responses keyed by request
//! URL, each with an expiry timestamp. Expiry is checked lazily on read.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::clock::{Clock, SystemClock};

/// A single cached response
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached data
    data: Value,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug, Clone, PartialEq)]
pub struct CachedData {
    /// The cached data
    pub data: Value,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    /// When the entry stops being fresh
    pub expires_at: DateTime<Utc>,
    /// Whether the cache entry has expired
    pub is_expired: bool,
}

/// Manages reading and writing cached responses in memory
///
/// Cloning a `CacheManager` is cheap and yields a handle to the same store, so
/// one cache can be shared between several clients by passing clones around.
/// Each entry carries an expiry timestamp computed from the injected `Clock`;
/// expired entries are still returned by [`CacheManager::read`] (with
/// `is_expired = true`) but never by [`CacheManager::get_fresh`].
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Cached entries keyed by request URL
    entries: Arc<DashMap<String, CacheEntry>>,
    /// Time source used for expiry
    clock: Arc<dyn Clock>,
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheManager {
    /// Creates an empty cache driven by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache driven by a custom clock
    ///
    /// Useful for testing expiry without waiting for real time to pass.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Returns the current time according to this cache's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Writes data to the cache with a specified TTL (time-to-live)
    ///
    /// Any existing entry for `key` is replaced, along with its expiry.
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the cache entry (the request URL)
    /// * `data` - The parsed response to cache
    /// * `ttl` - How long the cache entry should be considered fresh
    pub fn write(&self, key: &str, data: Value, ttl: std::time::Duration) {
        let now = self.clock.now();
        let expires_at = Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        debug!(key, %expires_at, "Caching response");
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                cached_at: now,
                expires_at,
            },
        );
    }

    /// Reads data from the cache
    ///
    /// Returns `None` if the cache entry doesn't exist.
    /// Returns `Some(CachedData)` with `is_expired = true` if the entry exists
    /// but has expired.
    pub fn read(&self, key: &str) -> Option<CachedData> {
        let entry = self.entries.get(key)?;
        let now = self.clock.now();

        Some(CachedData {
            data: entry.data.clone(),
            cached_at: entry.cached_at,
            expires_at: entry.expires_at,
            is_expired: now > entry.expires_at,
        })
    }

    /// Returns the cached value for `key` only if it has not expired
    pub fn get_fresh(&self, key: &str) -> Option<Value> {
        self.read(key)
            .filter(|cached| !cached.is_expired)
            .map(|cached| cached.data)
    }

    /// Removes the entry for `key`, returning whether one existed
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drops every entry whose expiry has passed and returns how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.expires_at);
        before.saturating_sub(self.entries.len())
    }

    /// Drops every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries currently stored, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry exists for `key`, expired or not
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
