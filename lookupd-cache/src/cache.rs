//! The TTL key/value store.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

/// A stored value together with its expiration instant.
///
/// The pair is only ever written as a unit under the exclusive lock, so a
/// reader can never observe a value paired with another entry's deadline.
struct CacheEntry<V> {
    value: V,
    /// `None` means the entry never expires.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }
}

/// Thread-safe in-memory key-value store with TTL support.
///
/// Keys are opaque strings; the cache performs no normalization and enforces
/// no namespace, so collision avoidance (e.g. a fixed provider prefix) is the
/// caller's job. Values are opaque payloads the cache clones out on reads.
///
/// `get` takes a shared lock and never blocks other readers; `set`, `remove`,
/// `clear` and [`purge_expired`](Self::purge_expired) take the exclusive lock.
/// None of the operations perform I/O or call back into caller code, so no
/// lock is ever held across slow work.
///
/// An entry whose deadline has passed is treated as absent by `get` even
/// before it is physically removed; removal is left to the periodic sweep
/// (see [`spawn_sweeper`](Self::spawn_sweeper)) or a later overwrite. With
/// TTLs shorter than the sweep interval this keeps dead entries in memory for
/// up to one interval, which is accepted.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> TtlCache<V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// A zero `ttl` means the entry never expires; it lives until it is
    /// overwritten, removed, or the cache is cleared.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = if ttl > Duration::ZERO {
            Some(Instant::now() + ttl)
        } else {
            None
        };

        self.entries
            .write()
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Returns a clone of the value stored under `key`.
    ///
    /// Returns `None` for unknown keys and for entries whose deadline has
    /// passed. Expired entries are not removed here; that is the sweep's job.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let now = Instant::now();
        let entries = self.entries.read();
        entries.get(key).and_then(|entry| {
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        })
    }

    /// Removes the entry for `key`; no-op when absent.
    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Physically removes every entry whose deadline is at or before now.
    ///
    /// Returns the number of entries removed. Since `get` already treats
    /// those entries as absent, this only reclaims memory and never changes
    /// an observable lookup outcome.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Returns the number of physically stored entries.
    ///
    /// Includes logically expired entries the sweep has not reclaimed yet.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len() - expired,
        }
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Debug)]
pub struct CacheStats {
    /// Physically stored entries (including expired ones awaiting the sweep).
    pub total_entries: usize,
    /// Entries past their deadline but not yet swept.
    pub expired_entries: usize,
    /// Entries still visible to `get`.
    pub valid_entries: usize,
}
