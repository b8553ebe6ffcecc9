//! Throughput Benchmark for stashkv
//!
//! This benchmark measures the performance of the store engine
//! under various workloads.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::json;
use stashkv::{Store, StoreConfig, NO_EXPIRY};
use tempfile::TempDir;

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let mut store = Store::new();

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store
                .set(&format!("key:{}", i), json!("small_value"), NO_EXPIRY)
                .unwrap();
            i += 1;
        });
    });

    group.bench_function("set_document", |b| {
        let mut i = 0u64;
        let value = json!({"name": "Ariz", "tags": ["a", "b", "c"], "score": 42});
        b.iter(|| {
            store
                .set(&format!("doc:{}", i), value.clone(), 3600)
                .unwrap();
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let mut store = Store::new();

    for i in 0..100_000 {
        store
            .set(&format!("key:{}", i), json!(format!("value:{}", i)), NO_EXPIRY)
            .unwrap();
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.get(&format!("key:{}", i % 100_000)).unwrap());
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.get(&format!("missing:{}", i)).unwrap());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark hash-set field writes and reads
fn bench_hash_set(c: &mut Criterion) {
    let mut store = Store::new();

    let mut group = c.benchmark_group("hash_set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("hset_fields", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store
                .hset(&format!("user:{}", i % 1000), "visits", json!(i), NO_EXPIRY)
                .unwrap();
            i += 1;
        });
    });

    group.bench_function("hget_fields", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.hget(&format!("user:{}", i % 1000), "visits").unwrap());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark INCR operations
fn bench_incr(c: &mut Criterion) {
    let mut store = Store::new();

    let mut group = c.benchmark_group("incr");
    group.throughput(Throughput::Elements(1));

    group.bench_function("single_counter", |b| {
        b.iter(|| {
            black_box(store.incr("counter", 1).unwrap());
        });
    });

    group.bench_function("multiple_counters", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.incr(&format!("counter:{}", i % 1000), 1).unwrap());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark KEYS pattern matching
fn bench_keys(c: &mut Criterion) {
    let mut store = Store::new();

    for i in 0..1_000 {
        store.set(&format!("user:{}", i), json!("user_data"), NO_EXPIRY).unwrap();
        store.set(&format!("session:{}", i), json!("session_data"), 3600).unwrap();
        store.set(&format!("cache:{}", i), json!("cache_data"), NO_EXPIRY).unwrap();
    }

    let mut group = c.benchmark_group("keys");

    group.bench_function("keys_pattern", |b| {
        b.iter(|| {
            black_box(store.keys("user:*").unwrap());
        });
    });

    group.bench_function("keys_alternation", |b| {
        b.iter(|| {
            black_box(store.keys("user:1|session:2").unwrap());
        });
    });

    group.bench_function("keys_all", |b| {
        b.iter(|| {
            black_box(store.keys("").unwrap());
        });
    });

    group.finish();
}

/// Benchmark snapshot dump and load
fn bench_snapshot(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::named("bench").with_dump_dir(dir.path());
    let mut store = Store::with_config(config.clone());

    for i in 0..10_000 {
        store.set(&format!("key:{}", i), json!({"n": i}), NO_EXPIRY).unwrap();
    }

    let mut group = c.benchmark_group("snapshot");
    group.sample_size(20);

    group.bench_function("dump_10k", |b| {
        b.iter(|| {
            black_box(store.dump().unwrap());
        });
    });

    group.bench_function("load_10k", |b| {
        b.iter(|| {
            let mut fresh = Store::with_config(config.clone());
            black_box(fresh.load().unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_hash_set,
    bench_incr,
    bench_keys,
    bench_snapshot,
);

criterion_main!(benches);
