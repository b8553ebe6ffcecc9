//! The Store Engine
//!
//! This module implements the store: a map from non-empty string keys to
//! [`Entry`] values with per-key expiry, a hash-set value type and JSON
//! snapshots.
//!
//! ## Expiry Policy
//!
//! Expired entries may linger between operations but are never observable:
//!
//! 1. **Targeted**: every single-key read or write first drops that key if it
//!    is due (`expires_at <= now`).
//! 2. **Full**: enumeration, describe and snapshot paths drop every due entry
//!    before they look at the map.
//!
//! ## Concurrency Model
//!
//! A `Store` has no internal locking; every operation takes `&mut self` and
//! runs to completion. Hosts that share a store across threads wrap it in a
//! [`SharedStore`]. `incr` is a read-modify-write and is only correct under a
//! single writer at a time.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::snapshot::Snapshot;
use crate::storage::clock::{Clock, SystemClock};
use crate::storage::entry::{Entry, EntryKind, Expiry};
use crate::storage::pattern::KeyPattern;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, trace};

/// TTL meaning "never expires".
pub const NO_EXPIRY: i64 = -1;

/// A store shared between threads or tasks.
///
/// The lock is a blocking `std::sync::Mutex`, also taken by an
/// [`ExpirySweeper`](crate::storage::ExpirySweeper) from inside a Tokio task.
/// Keep guards short-lived and never hold one across an `.await`.
pub type SharedStore = Arc<Mutex<Store>>;

/// Name and live key count of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    pub name: Option<String>,
    pub keys: usize,
}

impl fmt::Display for StoreInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, Store Keys Amount: {}",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.keys
        )
    }
}

/// An embedded key-value store.
///
/// # Example
///
/// ```
/// use stashkv::Store;
/// use serde_json::json;
///
/// let mut store = Store::named("sessions");
///
/// store.set("user", json!({"name": "Ariz"}), -1).unwrap();
/// assert_eq!(store.get("user").unwrap(), Some(json!({"name": "Ariz"})));
///
/// store.hset("h", "field", json!("1"), -1).unwrap();
/// assert_eq!(store.hget("h", "field").unwrap(), Some(json!("1")));
/// assert!(store.get("h").unwrap_err().is_type_mismatch());
///
/// assert_eq!(store.incr("counter", 1).unwrap(), 1);
/// assert_eq!(store.incr("counter", 5).unwrap(), 6);
/// ```
#[derive(Debug)]
pub struct Store {
    config: StoreConfig,
    entries: HashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates an unnamed in-memory store.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a named store whose snapshot lives in the current directory.
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_config(StoreConfig::named(name))
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a store that reads time from `clock`.
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            clock,
        }
    }

    /// Wraps the store for sharing; see [`SharedStore`].
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn snapshot_dir(&self) -> &Path {
        &self.config.dump_dir
    }

    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.config.snapshot_path()
    }

    #[inline]
    fn now(&self) -> i64 {
        self.clock.now()
    }

    fn require_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidArgument("key cannot be empty".into()));
        }
        Ok(())
    }

    // ========================================================================
    // EXPIRY
    // ========================================================================

    /// Removes `key` if it has expired. Returns true if it was removed.
    pub fn expire_if_due(&mut self, key: &str) -> bool {
        let now = self.now();
        let due = self
            .entries
            .get(key)
            .map(|entry| entry.is_expired(now))
            .unwrap_or(false);

        if due {
            self.entries.remove(key);
            trace!(key, "Expired key removed on access");
        }
        due
    }

    /// Removes every expired entry. Returns the number removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(
                removed,
                remaining = self.entries.len(),
                "Expired keys swept"
            );
        }
        removed
    }

    // ========================================================================
    // SCALAR OPERATIONS
    // ========================================================================

    /// Sets a scalar value, replacing whatever `key` held before.
    ///
    /// - `ttl > 0`: expires `ttl` seconds from now
    /// - `ttl == 0`: deletes `key` (not an error if absent)
    /// - `ttl < 0`: never expires (see [`NO_EXPIRY`])
    pub fn set(&mut self, key: &str, value: impl Into<Value>, ttl: i64) -> Result<()> {
        Self::require_key(key)?;

        if ttl == 0 {
            self.entries.remove(key);
            return Ok(());
        }

        let expiry = Expiry::from_ttl(ttl, self.now());
        self.entries
            .insert(key.to_string(), Entry::scalar(value.into(), expiry));
        Ok(())
    }

    /// Serializes `value` and stores it as a scalar.
    pub fn set_as<T: Serialize>(&mut self, key: &str, value: &T, ttl: i64) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| StoreError::InvalidArgument(format!("unserializable value: {e}")))?;
        self.set(key, value, ttl)
    }

    /// Gets a scalar value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist or has just expired, and
    /// a type mismatch if the key holds a hash-set.
    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        self.expire_if_due(key);

        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::Scalar { value, .. }) => Ok(Some(value.clone())),
            Some(Entry::HashSet { .. }) => Err(StoreError::type_mismatch(
                key,
                EntryKind::Scalar,
                EntryKind::HashSet,
            )),
        }
    }

    /// Gets a scalar value and deserializes it into `T`.
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                StoreError::InvalidArgument(format!("value at key {key} does not convert: {e}"))
            }),
        }
    }

    /// Adds `amount` to an integer scalar and returns the new value.
    ///
    /// A missing key is created with value `amount` and no expiry. An
    /// existing key keeps its expiry.
    pub fn incr(&mut self, key: &str, amount: i64) -> Result<i64> {
        Self::require_key(key)?;
        self.expire_if_due(key);

        match self.entries.get_mut(key) {
            None => {
                self.entries.insert(
                    key.to_string(),
                    Entry::scalar(Value::from(amount), Expiry::Never),
                );
                Ok(amount)
            }
            Some(Entry::HashSet { .. }) => Err(StoreError::type_mismatch(
                key,
                EntryKind::Scalar,
                EntryKind::HashSet,
            )),
            Some(Entry::Scalar { value, .. }) => {
                let current = value.as_i64().ok_or_else(|| StoreError::NotAnInteger {
                    key: key.to_string(),
                })?;
                let updated = current
                    .checked_add(amount)
                    .ok_or_else(|| StoreError::Overflow {
                        key: key.to_string(),
                    })?;
                *value = Value::from(updated);
                Ok(updated)
            }
        }
    }

    // ========================================================================
    // HASH-SET OPERATIONS
    // ========================================================================

    /// Writes `field` in the hash-set at `key`, creating the hash-set if needed.
    ///
    /// `ttl` only applies when the hash-set is created: `ttl > 0` expires it
    /// that many seconds from now, anything else makes it immortal. Field
    /// writes never renew the expiry.
    pub fn hset(&mut self, key: &str, field: &str, value: impl Into<Value>, ttl: i64) -> Result<()> {
        Self::require_key(key)?;
        self.expire_if_due(key);

        let now = self.now();
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::hash_set(Expiry::from_ttl(ttl, now)));

        match entry {
            Entry::HashSet { fields, .. } => {
                fields.insert(field.to_string(), value.into());
                Ok(())
            }
            Entry::Scalar { .. } => Err(StoreError::type_mismatch(
                key,
                EntryKind::HashSet,
                EntryKind::Scalar,
            )),
        }
    }

    /// Rewrites the expiry of an existing key of either kind.
    ///
    /// - `ttl > 0`: expires `ttl` seconds from now
    /// - `ttl == 0`: expires now, so the next access removes it
    /// - `ttl < 0`: never expires
    pub fn hset_expire(&mut self, key: &str, ttl: i64) -> Result<()> {
        self.expire_if_due(key);

        let now = self.now();
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        let expiry = if ttl == 0 {
            Expiry::At(now)
        } else {
            Expiry::from_ttl(ttl, now)
        };
        entry.set_expiry(expiry);
        Ok(())
    }

    /// Reads `field` from the hash-set at `key`.
    ///
    /// Returns `Ok(None)` if the key or the field is absent, and a type
    /// mismatch if the key holds a scalar. A scalar map that lacks `field`
    /// reads as absent before the type is checked.
    pub fn hget(&mut self, key: &str, field: &str) -> Result<Option<Value>> {
        self.expire_if_due(key);

        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::Scalar {
                value: Value::Object(map),
                ..
            }) if !map.contains_key(field) => Ok(None),
            Some(Entry::Scalar { .. }) => Err(StoreError::type_mismatch(
                key,
                EntryKind::HashSet,
                EntryKind::Scalar,
            )),
            Some(Entry::HashSet { fields, .. }) => Ok(fields.get(field).cloned()),
        }
    }

    // ========================================================================
    // KEY OPERATIONS
    // ========================================================================

    /// Returns all live keys matching `pattern`, sorted.
    ///
    /// Runs a full expiry sweep first. See [`KeyPattern`] for the pattern
    /// syntax; the empty pattern returns every key.
    pub fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        let pattern = KeyPattern::new(pattern)?;
        self.sweep_expired();

        let mut keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }

    /// Checks if a key exists (and is not expired).
    pub fn exists(&mut self, key: &str) -> bool {
        self.expire_if_due(key);
        self.entries.contains_key(key)
    }

    /// Deletes a key. Returns false if it didn't exist.
    pub fn delete(&mut self, key: &str) -> bool {
        self.expire_if_due(key);
        self.entries.remove(key).is_some()
    }

    /// Deletes keys in order, stopping at the first one that is missing.
    ///
    /// Returns true only if every key existed. Keys removed before the
    /// missing one stay removed.
    pub fn delete_many<I, K>(&mut self, keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter().all(|key| self.delete(key.as_ref()))
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Gets the remaining TTL for a key in seconds.
    ///
    /// # Returns
    ///
    /// - `Some(seconds)` if the key exists and has an expiry
    /// - `Some(-1)` if the key exists but has no expiry
    /// - `None` if the key doesn't exist
    pub fn ttl_seconds(&mut self, key: &str) -> Option<i64> {
        self.expire_if_due(key);
        let now = self.now();
        self.entries.get(key).map(|entry| entry.expiry().remaining(now))
    }

    /// Number of live keys (runs a full sweep).
    pub fn len(&mut self) -> usize {
        self.sweep_expired();
        self.entries.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Number of stored entries, counting expired ones not yet swept.
    pub fn stored_len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the store name and live key count after a full sweep.
    pub fn describe(&mut self) -> StoreInfo {
        StoreInfo {
            name: self.config.name.clone(),
            keys: self.len(),
        }
    }

    // ========================================================================
    // SNAPSHOTS
    // ========================================================================

    /// Captures the live entries as a snapshot (runs a full sweep).
    pub fn snapshot(&mut self) -> Snapshot {
        self.sweep_expired();
        Snapshot::capture(&self.entries, self.now(), self.config.kind_tags)
    }

    /// The snapshot mapping as a JSON value.
    pub fn export(&mut self) -> Value {
        self.snapshot().to_value()
    }

    fn require_snapshot_path(&self) -> Result<PathBuf> {
        self.snapshot_path().ok_or_else(|| {
            StoreError::InvalidArgument("store has no name to derive a snapshot path from".into())
        })
    }

    /// Writes the live entries to the store's snapshot file.
    ///
    /// Returns the number of entries written.
    pub fn dump(&mut self) -> Result<usize> {
        let path = self.require_snapshot_path()?;
        self.dump_to(&path)
    }

    /// Writes the live entries to `path`.
    pub fn dump_to(&mut self, path: &Path) -> Result<usize> {
        let snapshot = self.snapshot();
        snapshot.write_to(path, self.config.pretty)?;
        info!(path = %path.display(), entries = snapshot.len(), "Store dumped");
        Ok(snapshot.len())
    }

    /// Loads entries from the store's snapshot file.
    ///
    /// A missing file is not an error. Entries already expired are dropped;
    /// the rest overwrite same-named keys. Returns the number loaded.
    pub fn load(&mut self) -> Result<usize> {
        let path = self.require_snapshot_path()?;
        self.load_from(&path)
    }

    /// Loads entries from `path`.
    pub fn load_from(&mut self, path: &Path) -> Result<usize> {
        let Some(snapshot) = Snapshot::read_from(path)? else {
            debug!(path = %path.display(), "No snapshot to load");
            return Ok(0);
        };

        let total = snapshot.len();
        let now = self.now();
        let mut loaded = 0;
        for (key, entry) in snapshot.into_live_entries(now) {
            self.entries.insert(key, entry);
            loaded += 1;
        }

        info!(
            path = %path.display(),
            loaded,
            dropped = total - loaded,
            "Store loaded"
        );
        Ok(loaded)
    }
}
