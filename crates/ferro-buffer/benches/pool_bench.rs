//! Buffer pool benchmarks.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ferro_buffer::{BufferPoolInstance, ParallelBufferPool};
use ferro_common::config::BufferPoolConfig;
use ferro_storage::{DiskManager, MemDiskManager};

fn fetch_hit_benchmark(c: &mut Criterion) {
    let disk = Arc::new(MemDiskManager::new()) as Arc<dyn DiskManager>;
    let pool = BufferPoolInstance::new(64, disk, None);

    let mut ids = Vec::new();
    for _ in 0..64 {
        let (pid, _) = pool.new_page().unwrap().unwrap();
        pool.unpin_page(pid, false);
        ids.push(pid);
    }

    c.bench_function("fetch_hit_64", |b| {
        b.iter(|| {
            for &pid in &ids {
                let page = pool.fetch_page(pid).unwrap().unwrap();
                black_box(page.pin_count());
                pool.unpin_page(pid, false);
            }
        })
    });
}

fn evict_cycle_benchmark(c: &mut Criterion) {
    let disk = Arc::new(MemDiskManager::new()) as Arc<dyn DiskManager>;
    let pool = BufferPoolInstance::new(16, disk, None);

    c.bench_function("new_unpin_evict_cycle", |b| {
        b.iter(|| {
            // Twice the pool size, so half the allocations evict
            for _ in 0..32 {
                let (pid, _) = pool.new_page().unwrap().unwrap();
                pool.unpin_page(pid, black_box(false));
            }
        })
    });
}

fn parallel_new_page_benchmark(c: &mut Criterion) {
    let config = BufferPoolConfig::new(16, 4);
    let pool =
        ParallelBufferPool::new(&config, Arc::new(MemDiskManager::new()), None).unwrap();

    c.bench_function("parallel_new_page_rotation", |b| {
        b.iter(|| {
            for _ in 0..32 {
                let (pid, _) = pool.new_page().unwrap().unwrap();
                pool.unpin_page(pid, false);
            }
            black_box(pool.stats().evictions())
        })
    });
}

criterion_group!(
    benches,
    fetch_hit_benchmark,
    evict_cycle_benchmark,
    parallel_new_page_benchmark
);
criterion_main!(benches);
