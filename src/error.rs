//! Error types for store operations.
//!
//! Every fallible operation on a [`Store`](crate::storage::Store) returns
//! [`Result<T>`]. Errors are surfaced synchronously to the caller; nothing
//! in the engine retries.

use crate::storage::EntryKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while operating on a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A caller-supplied argument is unusable (for example an empty key).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation requires an existing key and it is absent.
    #[error("key not found: {0}")]
    NotFound(String),

    /// A scalar operation hit a hash-set key, or the other way round.
    #[error("key {key} holds a {found}, not a {expected}")]
    TypeMismatch {
        key: String,
        expected: EntryKind,
        found: EntryKind,
    },

    /// `incr` was invoked on a scalar whose value is not an integer.
    #[error("value at key {key} is not an integer")]
    NotAnInteger { key: String },

    /// `incr` would overflow a 64-bit signed integer.
    #[error("increment of key {key} would overflow")]
    Overflow { key: String },

    /// The key pattern could not be compiled.
    #[error("invalid key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Reading or writing a snapshot file failed.
    #[error("snapshot I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot content does not have the expected record shape.
    #[error("malformed snapshot {}: {source}", path.display())]
    MalformedSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Returns true for every error that reports a type-discipline violation.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            StoreError::TypeMismatch { .. } | StoreError::NotAnInteger { .. }
        )
    }

    /// Returns true for argument errors, including a rejected key pattern.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidArgument(_)
                | StoreError::Overflow { .. }
                | StoreError::InvalidPattern(_)
        )
    }

    pub(crate) fn type_mismatch(key: &str, expected: EntryKind, found: EntryKind) -> Self {
        StoreError::TypeMismatch {
            key: key.to_string(),
            expected,
            found,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let err = StoreError::type_mismatch("h", EntryKind::Scalar, EntryKind::HashSet);
        assert_eq!(err.to_string(), "key h holds a hashset, not a pair");
        assert!(err.is_type_mismatch());
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_not_an_integer_is_type_mismatch() {
        let err = StoreError::NotAnInteger { key: "c".into() };
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_io_message_includes_path() {
        let err = StoreError::Io {
            path: PathBuf::from("/tmp/none/store.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/none/store.json"));
    }
}
