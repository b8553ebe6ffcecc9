//! The unit of storage.
//!
//! An entry is either a scalar pair (any JSON value) or a hash-set (a
//! string-keyed map of fields). Both carry one absolute expiry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Tag distinguishing the two entry shapes.
///
/// The serialized names are the ones written into snapshot records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// A plain key/value pair.
    #[serde(rename = "pair")]
    Scalar,
    /// A map of fields under one key.
    #[serde(rename = "hashset")]
    HashSet,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Scalar => f.write_str("pair"),
            EntryKind::HashSet => f.write_str("hashset"),
        }
    }
}

/// When an entry stops being readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiry {
    /// Never expires (persisted as `-1`).
    Never,
    /// Expires once the clock reaches this Unix timestamp.
    At(i64),
}

impl Expiry {
    /// Expiry for a relative TTL given at time `now`.
    ///
    /// Positive TTLs expire at `now + ttl`; anything else never expires.
    pub fn from_ttl(ttl: i64, now: i64) -> Self {
        if ttl > 0 {
            Expiry::At(now.saturating_add(ttl))
        } else {
            Expiry::Never
        }
    }

    /// Decodes the persisted `timeout` representation.
    ///
    /// Only `-1` means never; other negative values are timestamps in the
    /// past and therefore already due.
    pub fn from_timeout(timeout: i64) -> Self {
        if timeout == -1 {
            Expiry::Never
        } else {
            Expiry::At(timeout)
        }
    }

    /// Encodes to the persisted `timeout` representation.
    pub fn timeout(&self) -> i64 {
        match self {
            Expiry::Never => -1,
            Expiry::At(at) => *at,
        }
    }

    /// An entry is due once `expires_at <= now`.
    #[inline]
    pub fn is_due(&self, now: i64) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(at) => *at <= now,
        }
    }

    /// Remaining whole seconds, or `-1` for an immortal entry.
    pub fn remaining(&self, now: i64) -> i64 {
        match self {
            Expiry::Never => -1,
            Expiry::At(at) => at - now,
        }
    }
}

/// A stored entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A scalar pair.
    Scalar { value: Value, expiry: Expiry },
    /// A hash-set of fields sharing one expiry.
    HashSet {
        fields: Map<String, Value>,
        expiry: Expiry,
    },
}

impl Entry {
    /// Creates a scalar entry.
    pub fn scalar(value: Value, expiry: Expiry) -> Self {
        Entry::Scalar { value, expiry }
    }

    /// Creates an empty hash-set entry.
    pub fn hash_set(expiry: Expiry) -> Self {
        Entry::HashSet {
            fields: Map::new(),
            expiry,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Scalar { .. } => EntryKind::Scalar,
            Entry::HashSet { .. } => EntryKind::HashSet,
        }
    }

    pub fn expiry(&self) -> Expiry {
        match self {
            Entry::Scalar { expiry, .. } | Entry::HashSet { expiry, .. } => *expiry,
        }
    }

    /// Replaces the expiry without touching the value.
    pub fn set_expiry(&mut self, new_expiry: Expiry) {
        match self {
            Entry::Scalar { expiry, .. } | Entry::HashSet { expiry, .. } => *expiry = new_expiry,
        }
    }

    #[inline]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiry().is_due(now)
    }

    /// The value as it appears in a snapshot record.
    pub fn to_value(&self) -> Value {
        match self {
            Entry::Scalar { value, .. } => value.clone(),
            Entry::HashSet { fields, .. } => Value::Object(fields.clone()),
        }
    }
}
