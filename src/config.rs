//! Store and sweeper configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a [`Store`](crate::storage::Store).
///
/// # Example
///
/// ```
/// use stashkv::StoreConfig;
///
/// let config = StoreConfig::named("transactions")
///     .with_dump_dir("/var/lib/app")
///     .with_pretty_snapshots(true);
/// assert_eq!(
///     config.snapshot_path().unwrap(),
///     std::path::Path::new("/var/lib/app/transactions.json")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store name; the snapshot file is `<name>.json`. Unnamed stores cannot dump or load.
    pub name: Option<String>,

    /// Directory holding the snapshot file (default: the current working directory)
    pub dump_dir: PathBuf,

    /// Write a `kind` field into each snapshot record so hash-sets reload as hash-sets
    pub kind_tags: bool,

    /// Pretty-print snapshot JSON
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: None,
            dump_dir: PathBuf::from("."),
            kind_tags: true,
            pretty: false,
        }
    }
}

impl StoreConfig {
    /// Creates an unnamed configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration for a named store.
    pub fn named(name: impl Into<String>) -> Self {
        Self::default().with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_dump_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dump_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Enables or disables the `kind` discriminator in snapshot records.
    ///
    /// With tags disabled every record reloads as a scalar pair, so a dumped
    /// hash-set comes back as a plain map value.
    pub fn with_kind_tags(mut self, enabled: bool) -> Self {
        self.kind_tags = enabled;
        self
    }

    pub fn with_pretty_snapshots(mut self, enabled: bool) -> Self {
        self.pretty = enabled;
        self
    }

    /// Path of the snapshot file, if the store is named.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.name
            .as_ref()
            .map(|name| self.dump_dir.join(format!("{name}.json")))
    }
}

/// Configuration for the background expiry sweeper.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Interval the sweeper starts with (default: 1s)
    pub base_interval: Duration,

    /// Shortest interval between sweeps (default: 100ms)
    pub min_interval: Duration,

    /// Longest interval between sweeps (default: 10s)
    pub max_interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(1),
            min_interval: Duration::from_millis(100),
            max_interval: Duration::from_secs(10),
        }
    }
}

impl SweepConfig {
    /// Shortens the interval after a sweep that removed keys, lengthens it otherwise.
    pub fn next_interval(&self, current: Duration, removed: usize) -> Duration {
        if removed > 0 {
            (current / 2).max(self.min_interval)
        } else {
            (current * 2).min(self.max_interval)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.name.is_none());
        assert_eq!(config.dump_dir, PathBuf::from("."));
        assert!(config.kind_tags);
        assert!(!config.pretty);
        assert!(config.snapshot_path().is_none());
    }

    #[test]
    fn test_snapshot_path() {
        let config = StoreConfig::named("a").with_dump_dir("/data");
        assert_eq!(config.snapshot_path(), Some(PathBuf::from("/data/a.json")));
    }

    #[test]
    fn test_builder_chaining() {
        let config = StoreConfig::new()
            .with_name("cache")
            .with_kind_tags(false)
            .with_pretty_snapshots(true);
        assert_eq!(config.name.as_deref(), Some("cache"));
        assert!(!config.kind_tags);
        assert!(config.pretty);
    }

    #[test]
    fn test_sweep_interval_adapts() {
        let config = SweepConfig {
            base_interval: Duration::from_millis(400),
            min_interval: Duration::from_millis(100),
            max_interval: Duration::from_millis(1000),
        };
        assert_eq!(
            config.next_interval(Duration::from_millis(400), 3),
            Duration::from_millis(200)
        );
        assert_eq!(
            config.next_interval(Duration::from_millis(150), 3),
            Duration::from_millis(100)
        );
        assert_eq!(
            config.next_interval(Duration::from_millis(800), 0),
            Duration::from_millis(1000)
        );
    }
}
