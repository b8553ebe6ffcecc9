//! # stashkv - An Embedded Key-Value Store
//!
//! stashkv is an in-process key-value store that borrows a handful of cache
//! semantics: per-key expiry, a nested hash-set value type, pattern-based key
//! enumeration and JSON snapshots. It is a library, not a network service.
//!
//! ## Features
//!
//! - **Structured values**: any JSON value can be stored under a key
//! - **Hash-sets**: string-keyed maps of fields sharing one expiry
//! - **TTL Support**: keys expire at an absolute Unix second
//! - **Lazy + Full Expiry**: expired keys are dropped on access and swept in
//!   full before enumeration and snapshots
//! - **Snapshots**: `dump` and `load` a `<name>.json` file
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │                                                             │
//! │  ┌─────────────┐   ┌─────────────┐   ┌──────────────────┐   │
//! │  │ set / get   │   │ hset / hget │   │ keys / delete    │   │
//! │  │ incr        │   │ hset_expire │   │ ttl_seconds      │   │
//! │  └──────┬──────┘   └──────┬──────┘   └────────┬─────────┘   │
//! │         └─────────────────┼───────────────────┘             │
//! │                           ▼                                 │
//! │             HashMap<String, Entry> + Clock                  │
//! │                           │                                 │
//! │                           ▼                                 │
//! │                 Snapshot (dump / load)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use stashkv::{Store, StoreConfig};
//! use serde_json::json;
//!
//! fn main() -> stashkv::Result<()> {
//!     let mut store = Store::with_config(StoreConfig::named("transactions").with_dump_dir("/tmp"));
//!     store.load()?;
//!
//!     store.set("apple", json!(2), 60)?;
//!     store.hset("user:1", "name", json!("Ariz"), -1)?;
//!     store.incr("visits", 1)?;
//!
//!     for key in store.keys("a.|user")? {
//!         println!("{key}");
//!     }
//!
//!     store.dump()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`storage`]: the store engine, entry model, expiry and key patterns
//! - [`snapshot`]: the JSON snapshot format
//! - [`config`]: store and sweeper configuration
//! - [`error`]: the error taxonomy

pub mod config;
pub mod error;
pub mod snapshot;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{StoreConfig, SweepConfig};
pub use error::{Result, StoreError};
pub use snapshot::{Snapshot, SnapshotRecord};
pub use storage::{
    Clock, Entry, EntryKind, Expiry, ExpirySweeper, ManualClock, SharedStore, Store, StoreInfo,
    SystemClock, NO_EXPIRY,
};

/// Version of stashkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
