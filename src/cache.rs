//! In-process caches backing the resolvers.
//!
//! [`KeyCache`] maps a local user id to that user's known remote public
//! keys with unbounded retention; staleness is the reader's concern (see
//! [`crate::key`]), not handled by eviction. [`MemoryKvCache`] is the
//! TTL'd identity cache used for user lookups.
//!
//! Neither cache de-duplicates concurrent population of the same key:
//! loaders run outside the lock, so concurrent misses may each invoke
//! their loader. That is tolerated because writes are idempotent
//! whole-value replacements.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::model::PublicKeyRecord;

/// A cached key list for one user. `value: None` records an explicit
/// "no usable keys" answer from the loader.
#[derive(Debug, Clone)]
struct KeyCacheEntry {
    value: Option<Vec<PublicKeyRecord>>,
    inserted_at: DateTime<Utc>,
}

/// Cache of remote public keys, keyed by local user id.
///
/// Entries are retained until [`KeyCache::invalidate`] or
/// [`KeyCache::dispose_all`]; writes replace the whole entry.
#[derive(Debug, Default)]
pub struct KeyCache {
    entries: RwLock<HashMap<String, KeyCacheEntry>>,
}

impl KeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the cached value for a user, regardless of age.
    ///
    /// Outer `None` means no entry; inner `None` is a cached explicit
    /// "no keys" answer.
    pub fn get(&self, user_id: &str) -> Option<Option<Vec<PublicKeyRecord>>> {
        self.entries
            .read()
            .expect("key cache lock poisoned")
            .get(user_id)
            .map(|entry| entry.value.clone())
    }

    /// Raw insertion timestamp of the entry for a user, if one exists.
    pub fn inserted_at(&self, user_id: &str) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .expect("key cache lock poisoned")
            .get(user_id)
            .map(|entry| entry.inserted_at)
    }

    /// Return the cached value when a usable one exists, otherwise invoke
    /// the loader and cache its answer wholesale.
    ///
    /// A cached `Some(vec![])` is trusted; only an absent entry (or a
    /// cached explicit `None`) re-invokes the loader.
    pub async fn fetch_or_load<F, Fut>(
        &self,
        user_id: &str,
        loader: F,
    ) -> Result<Option<Vec<PublicKeyRecord>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Vec<PublicKeyRecord>>>>,
    {
        {
            let entries = self.entries.read().expect("key cache lock poisoned");
            if let Some(entry) = entries.get(user_id)
                && entry.value.is_some()
            {
                return Ok(entry.value.clone());
            }
        }

        let value = loader().await?;
        let mut entries = self.entries.write().expect("key cache lock poisoned");
        entries.insert(
            user_id.to_string(),
            KeyCacheEntry {
                value: value.clone(),
                inserted_at: Utc::now(),
            },
        );
        Ok(value)
    }

    /// Drop the entry for a user unconditionally.
    pub fn invalidate(&self, user_id: &str) {
        self.entries
            .write()
            .expect("key cache lock poisoned")
            .remove(user_id);
    }

    /// Clear the whole cache. Called once at service shutdown; safe when
    /// no entries were ever created, and safe to call repeatedly.
    pub fn dispose_all(&self) {
        self.entries
            .write()
            .expect("key cache lock poisoned")
            .clear();
    }
}

/// Entry count above which a write sweeps expired entries.
const SWEEP_THRESHOLD: usize = 1024;

/// A TTL'd key-value cache with lazy fetch-through population.
///
/// Expired entries count as misses and are swept opportunistically on
/// writes once the map grows past [`SWEEP_THRESHOLD`].
#[derive(Debug)]
pub struct MemoryKvCache<V> {
    lifetime: Duration,
    entries: RwLock<HashMap<String, (V, DateTime<Utc>)>>,
}

impl<V: Clone> MemoryKvCache<V> {
    /// Create a cache whose entries live for `lifetime`.
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Read a live entry; an expired one is a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().expect("kv cache lock poisoned");
        let (value, cached_at) = entries.get(key)?;
        if Utc::now() - *cached_at < self.lifetime {
            Some(value.clone())
        } else {
            None
        }
    }

    /// Store a value, replacing any previous entry for the key.
    pub fn set(&self, key: &str, value: V) {
        let mut entries = self.entries.write().expect("kv cache lock poisoned");
        if entries.len() >= SWEEP_THRESHOLD {
            let now = Utc::now();
            let lifetime = self.lifetime;
            entries.retain(|_, (_, cached_at)| now - *cached_at < lifetime);
        }
        entries.insert(key.to_string(), (value, Utc::now()));
    }

    /// Return the cached value, or invoke the loader and cache a `Some`
    /// answer. A `None` from the loader is passed through uncached so the
    /// next call asks again.
    pub async fn fetch_maybe<F, Fut>(&self, key: &str, loader: F) -> Result<Option<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(Some(value));
        }

        let value = loader().await?;
        if let Some(value) = &value {
            self.set(key, value.clone());
        }
        Ok(value)
    }

    /// Drop the entry for a key.
    pub fn delete(&self, key: &str) {
        self.entries
            .write()
            .expect("kv cache lock poisoned")
            .remove(key);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries
            .write()
            .expect("kv cache lock poisoned")
            .clear();
    }
}
