//! Key-value storage substrates for the local cache.
//!
//! Two substrates back the typed caches, mirroring the two kinds of
//! client-side storage they stand in for:
//!
//! - [`VolatileStore`] - no expiry, cleared explicitly (the browser-local
//!   store analogue);
//! - [`DurableStore`] - per-entry time-to-live (the cookie store
//!   analogue).
//!
//! Reads never fail: a missing or expired key is simply `None`. Entries
//! are not guarded against concurrent writers - last writer wins.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;

const MAX_ENTRIES: u64 = 10_000;

/// Narrow key-value capability injected into the typed caches.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing and expired keys return `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, with an optional time-to-live.
    fn set(&self, key: &str, value: String, ttl: Option<Duration>);

    /// Remove a value. Removing a missing key is a no-op.
    fn remove(&self, key: &str);
}

/// In-memory store without expiry.
#[derive(Clone)]
pub struct VolatileStore {
    entries: Cache<String, String>,
}

impl VolatileStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().max_capacity(MAX_ENTRIES).build(),
        }
    }
}

impl Default for VolatileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for VolatileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key)
    }

    fn set(&self, key: &str, value: String, _ttl: Option<Duration>) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.invalidate(key);
    }
}

/// Stored value plus the time-to-live it was written with.
#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Option<Duration>,
}

/// Expiry policy reading each entry's own time-to-live.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// In-memory store with per-entry expiry.
#[derive(Clone)]
pub struct DurableStore {
    entries: Cache<String, Entry>,
}

impl DurableStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }
}

impl Default for DurableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for DurableStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value)
    }

    fn set(&self, key: &str, value: String, ttl: Option<Duration>) {
        self.entries.insert(key.to_string(), Entry { value, ttl });
    }

    fn remove(&self, key: &str) {
        self.entries.invalidate(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volatile_store_round_trip() {
        let store = VolatileStore::new();
        assert_eq!(store.get("k"), None);

        store.set("k", "v".to_string(), None);
        assert_eq!(store.get("k"), Some("v".to_string()));

        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_volatile_store_remove_missing_key_is_noop() {
        let store = VolatileStore::new();
        store.remove("missing");
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_durable_store_expires_entries() {
        let store = DurableStore::new();
        store.set("k", "v".to_string(), Some(Duration::from_millis(10)));
        assert_eq!(store.get("k"), Some("v".to_string()));

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_durable_store_without_ttl_does_not_expire() {
        let store = DurableStore::new();
        store.set("k", "v".to_string(), None);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(store.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_durable_store_last_writer_wins() {
        let store = DurableStore::new();
        store.set("k", "first".to_string(), None);
        store.set("k", "second".to_string(), None);
        assert_eq!(store.get("k"), Some("second".to_string()));
    }
}
