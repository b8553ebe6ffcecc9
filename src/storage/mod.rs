//! Storage Engine Module
//!
//! This module provides the store engine: the entry model, the expiry
//! policy, key patterns and the [`Store`] itself, plus an optional
//! background sweeper for shared stores.
//!
//! ## Features
//!
//! - **Two entry kinds**: scalar pairs holding any JSON value, and hash-sets
//!   of fields under one key
//! - **TTL Support**: keys expire at an absolute Unix second
//! - **Lazy Expiry**: a key is checked and dropped when it is accessed
//! - **Full Sweep**: enumeration and snapshots drop every expired key first
//! - **Snapshots**: dump to and load from a JSON file
//!
//! ## Example
//!
//! ```
//! use stashkv::storage::{Store, NO_EXPIRY};
//! use serde_json::json;
//!
//! let mut store = Store::new();
//!
//! store.set("name", json!("Ariz"), NO_EXPIRY).unwrap();
//! assert_eq!(store.get("name").unwrap(), Some(json!("Ariz")));
//!
//! // Expires in an hour
//! store.set("session", json!("token123"), 3600).unwrap();
//! assert!(store.ttl_seconds("session").unwrap() > 0);
//! ```

pub mod clock;
pub mod engine;
pub mod entry;
pub mod expiry;
pub mod pattern;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{SharedStore, Store, StoreInfo, NO_EXPIRY};
pub use entry::{Entry, EntryKind, Expiry};
pub use expiry::ExpirySweeper;
pub use pattern::KeyPattern;
