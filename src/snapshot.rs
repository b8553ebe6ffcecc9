//! JSON snapshot format.
//!
//! A snapshot is a JSON object mapping each key to a record:
//!
//! ```text
//! { "<key>": { "value": <json>, "timeout": <int>, "ttl_seconds": <int>, "kind": "pair" | "hashset" } }
//! ```
//!
//! - `timeout` is the absolute expiry in Unix seconds, `-1` for immortal keys.
//! - `ttl_seconds` is informational. It is recomputed at every dump and
//!   never read back.
//! - `kind` is optional. Records without it reload as scalar pairs.
//!
//! Files are written in place; a crash mid-write can leave a truncated
//! file, which then fails to load as [`StoreError::MalformedSnapshot`].

use crate::error::{Result, StoreError};
use crate::storage::{Entry, EntryKind, Expiry};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// One persisted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub value: Value,
    pub timeout: i64,
    #[serde(default)]
    pub ttl_seconds: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntryKind>,
}

impl SnapshotRecord {
    fn from_entry(entry: &Entry, now: i64, kind_tags: bool) -> Self {
        let expiry = entry.expiry();
        Self {
            value: entry.to_value(),
            timeout: expiry.timeout(),
            ttl_seconds: expiry.remaining(now),
            kind: kind_tags.then(|| entry.kind()),
        }
    }

    /// Rebuilds the entry from `value` and `timeout` only.
    pub fn into_entry(self) -> Entry {
        let expiry = Expiry::from_timeout(self.timeout);
        match (self.kind, self.value) {
            (Some(EntryKind::HashSet), Value::Object(fields)) => Entry::HashSet { fields, expiry },
            (_, value) => Entry::scalar(value, expiry),
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        Expiry::from_timeout(self.timeout).is_due(now)
    }
}

/// An in-memory snapshot of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: BTreeMap<String, SnapshotRecord>,
}

impl Snapshot {
    /// Captures the given entries as of `now`.
    pub fn capture<'a, I>(entries: I, now: i64, kind_tags: bool) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Entry)>,
    {
        let records = entries
            .into_iter()
            .map(|(key, entry)| {
                (
                    key.clone(),
                    SnapshotRecord::from_entry(entry, now, kind_tags),
                )
            })
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&SnapshotRecord> {
        self.records.get(key)
    }

    /// Consumes the snapshot, yielding only entries still live at `now`.
    ///
    /// Records with an empty key are skipped.
    pub fn into_live_entries(self, now: i64) -> impl Iterator<Item = (String, Entry)> {
        self.records.into_iter().filter_map(move |(key, record)| {
            if key.is_empty() {
                warn!("Skipping snapshot record with an empty key");
                return None;
            }
            if record.is_expired(now) {
                return None;
            }
            Some((key, record.into_entry()))
        })
    }

    pub fn encode(&self, pretty: bool) -> serde_json::Result<Bytes> {
        let buf = if pretty {
            serde_json::to_vec_pretty(self)?
        } else {
            serde_json::to_vec(self)?
        };
        Ok(Bytes::from(buf))
    }

    pub fn decode(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }

    pub fn to_value(&self) -> Value {
        let map = self
            .records
            .iter()
            .map(|(key, record)| {
                let value = serde_json::to_value(record).unwrap_or(Value::Null);
                (key.clone(), value)
            })
            .collect();
        Value::Object(map)
    }

    /// Writes the snapshot to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path, pretty: bool) -> Result<()> {
        let data = self
            .encode(pretty)
            .map_err(|source| StoreError::MalformedSnapshot {
                path: path.to_path_buf(),
                source,
            })?;
        fs::write(path, &data).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = data.len(), records = self.len(), "Snapshot written");
        Ok(())
    }

    /// Reads a snapshot from `path`. A missing file yields `Ok(None)`.
    pub fn read_from(path: &Path) -> Result<Option<Self>> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let snapshot = Self::decode(&data).map_err(|source| StoreError::MalformedSnapshot {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = data.len(), records = snapshot.len(), "Snapshot read");
        Ok(Some(snapshot))
    }
}
