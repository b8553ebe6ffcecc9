//! stashkv demo
//!
//! Loads a named store from its snapshot, runs a handful of operations
//! against it and dumps it back.

use serde_json::json;
use stashkv::{ExpirySweeper, Store, StoreConfig, SweepConfig, NO_EXPIRY};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Demo configuration
struct Config {
    /// Store name (snapshot file is `<name>.json`)
    name: String,
    /// Directory holding the snapshot
    dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "transactions".to_string(),
            dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--name" | "-n" => {
                    if i + 1 < args.len() {
                        config.name = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --name requires a value");
                        std::process::exit(1);
                    }
                }
                "--dir" | "-d" => {
                    if i + 1 < args.len() {
                        config.dir = PathBuf::from(&args[i + 1]);
                        i += 2;
                    } else {
                        eprintln!("Error: --dir requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("stashkv version {}", stashkv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }
}

fn print_help() {
    println!(
        r#"
stashkv - An Embedded Key-Value Store (demo)

USAGE:
    stashkv [OPTIONS]

OPTIONS:
    -n, --name <NAME>    Store name (default: transactions)
    -d, --dir <DIR>      Snapshot directory (default: current directory)
    -v, --version        Print version information
    -h, --help           Print this help message

Set RUST_LOG=debug to see expiry and snapshot details.
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let store_config = StoreConfig::named(&config.name)
        .with_dump_dir(&config.dir)
        .with_pretty_snapshots(true);
    let shared = Store::with_config(store_config).into_shared();
    let _sweeper = ExpirySweeper::start(Arc::clone(&shared), SweepConfig::default());

    let mut store = shared
        .lock()
        .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;

    let loaded = store.load()?;
    info!(loaded, "Snapshot loaded");

    store.set("dict", json!({"test": "other value"}), NO_EXPIRY)?;
    store.set("list", json!([]), NO_EXPIRY)?;
    for key in ["apple", "airplane", "grass", "b"] {
        store.set(key, json!(2), 1)?;
    }
    store.set("d", json!([1, 2, 3, 4]), 30)?;

    println!("keys a.       -> {:?}", store.keys("a.")?);
    println!("keys a.|grass -> {:?}", store.keys("a.|grass")?);

    store.set("counter", json!(0), NO_EXPIRY)?;
    store.incr("counter", 1)?;
    let counter = store.incr("counter", 5)?;
    println!("counter       -> {counter}");

    store.hset("profile", "name", json!("Ariz"), NO_EXPIRY)?;
    store.hset("profile", "visits", json!(1), NO_EXPIRY)?;
    println!("profile.name  -> {:?}", store.hget("profile", "name")?);

    if let Err(e) = store.get("profile") {
        println!("get profile   -> {e}");
    }

    println!("{}", store.describe());

    let written = store.dump()?;
    if let Some(path) = store.snapshot_path() {
        info!(written, path = %path.display(), "Snapshot written");
    }

    Ok(())
}
