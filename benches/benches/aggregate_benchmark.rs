//! Aggregation and tick store benchmarks.
//!
//! Run with: `cargo bench --package ledgerbar-bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ledgerbar_bench::synthetic_records;
use ledgerbar_lib::{PrecisionMode, TickStore, Timeframe, aggregate_records};
use std::hint::black_box;
use tempfile::TempDir;

const START: i64 = 1_704_067_200;

fn aggregate_benchmark(c: &mut Criterion) {
    let records = synthetic_records(100_000, START);

    let mut group = c.benchmark_group("aggregate");
    group.throughput(Throughput::Elements(records.len() as u64));

    for mode in [PrecisionMode::Approximate, PrecisionMode::Exact] {
        for timeframe in [Timeframe::Minute1, Timeframe::Hour1, Timeframe::Day1] {
            group.bench_with_input(
                BenchmarkId::new(mode.as_str(), timeframe.label()),
                &timeframe,
                |b, timeframe| {
                    b.iter(|| {
                        aggregate_records(black_box(&records), timeframe.seconds(), mode).unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

fn store_benchmark(c: &mut Criterion) {
    let records = synthetic_records(20_000, START);
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let temp_dir = TempDir::new().unwrap();
    let store = TickStore::new(temp_dir.path().join("ticks.csv"));

    let mut group = c.benchmark_group("store");
    group.sample_size(20);
    group.throughput(Throughput::Elements(records.len() as u64));

    group.bench_function("write", |b| {
        b.iter(|| runtime.block_on(store.write(&records)).unwrap());
    });

    runtime.block_on(store.write(&records)).unwrap();
    group.bench_function("read", |b| {
        b.iter(|| runtime.block_on(store.read()).unwrap());
    });

    group.finish();
}

criterion_group!(benches, aggregate_benchmark, store_benchmark);
criterion_main!(benches);
