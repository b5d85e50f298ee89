//! Benchmarks for the bounded LRU cache.
//!
//! Run with: cargo bench

use bounded_lru_cache::{Cache, CacheConfig, NoopDiagnostics, Selector};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn quiet_cache(capacity: usize) -> Cache<String, String> {
    let config = CacheConfig::builder()
        .capacity(capacity)
        .diagnostics(NoopDiagnostics)
        .build()
        .expect("valid capacity");
    Cache::new(config)
}

/// Benchmark single-threaded get/add operations.
fn bench_single_threaded(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");

    let cache = quiet_cache(100_000);

    // Pre-populate some keys
    for i in 0..10_000 {
        cache.add(format!("key_{}", i), format!("value_{}", i));
    }

    group.bench_function("get_existing", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("key_{}", i % 10_000);
            black_box(cache.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("missing_{}", i);
            black_box(cache.get(&key));
            i += 1;
        });
    });

    group.bench_function("add_new", |b| {
        let cache = quiet_cache(1_000_000);
        let mut i = 0;
        b.iter(|| {
            cache.add(format!("new_key_{}", i), "value".to_string());
            i += 1;
        });
    });

    group.bench_function("update_existing", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("key_{}", i % 10_000);
            cache.update(key, "updated_value".to_string());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark concurrent operations.
fn bench_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for num_threads in [2, 4, 8].iter() {
        let cache = quiet_cache(100_000);

        // Pre-populate
        for i in 0..10_000 {
            cache.add(format!("key_{}", i), format!("value_{}", i));
        }

        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(
            BenchmarkId::new("mixed_ops", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|t| {
                            let cache = cache.clone();
                            std::thread::spawn(move || {
                                for i in 0..1000 {
                                    let key = format!("key_{}", (t * 1000 + i) % 10_000);
                                    if i % 5 == 0 {
                                        cache.add(key, "value".to_string());
                                    } else {
                                        black_box(cache.get(&key));
                                    }
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the filter modes over a full cache.
fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    let cache = quiet_cache(10_000);
    for i in 0..10_000 {
        cache.add(format!("key_{}", i), format!("value_{}", i));
    }

    let glob = Selector::glob("key_1*").unwrap();
    let regex = Selector::regex_str("key_(1|2)").unwrap();
    let keys = Selector::keys((0..100).map(|i| format!("key_{}", i * 7)));

    group.throughput(Throughput::Elements(10_000));
    group.bench_function("glob", |b| b.iter(|| black_box(cache.filter(&glob))));
    group.bench_function("regex", |b| b.iter(|| black_box(cache.filter(&regex))));
    group.bench_function("keys", |b| b.iter(|| black_box(cache.filter(&keys))));

    group.finish();
}

/// Benchmark eviction under pressure.
fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction");

    // Small cache that will constantly evict
    let cache = quiet_cache(1000);

    // Fill the cache
    for i in 0..1000 {
        cache.add(format!("key_{}", i), "value".to_string());
    }

    group.bench_function("add_with_eviction", |b| {
        let mut i = 1000;
        b.iter(|| {
            cache.add(format!("key_{}", i), "value".to_string());
            i += 1;
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_threaded,
    bench_concurrent,
    bench_filter,
    bench_eviction,
);
criterion_main!(benches);
