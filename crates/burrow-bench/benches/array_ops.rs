//! Criterion micro-benchmarks for growable array append, positional edits
//! and view sorting.

use std::hint::black_box;

use burrow_collections::GrowableArray;
use burrow_test_utils::distinct_keys;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

fn bench_array_append_100k(c: &mut Criterion) {
    c.bench_function("array_append_100k", |b| {
        b.iter(|| {
            let mut array = GrowableArray::<u64>::new();
            for i in 0..100_000u64 {
                array.add(i).unwrap();
            }
            black_box(array.len());
        });
    });
}

fn bench_array_insert_front(c: &mut Criterion) {
    c.bench_function("array_insert_front_1k", |b| {
        b.iter(|| {
            let mut array = GrowableArray::<u32>::with_capacity(1024);
            for i in 0..1_000u32 {
                array.insert_at(0, i, 1).unwrap();
            }
            black_box(array.first());
        });
    });
}

fn bench_array_remove_middle(c: &mut Criterion) {
    let data: Vec<u32> = (0..10_000).collect();
    c.bench_function("array_remove_middle_block", |b| {
        b.iter_batched(
            || GrowableArray::from_slice(&data),
            |mut array| {
                array.remove_at(2_500, 5_000).unwrap();
                black_box(array.len());
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_array_view_sort(c: &mut Criterion) {
    let keys = distinct_keys(10_000, 2);
    c.bench_function("array_view_sort_10k", |b| {
        b.iter_batched(
            || GrowableArray::from_slice(&keys),
            |mut array| {
                array.as_view_mut().unwrap().sort_unstable();
                black_box(array.first());
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_array_append_100k,
    bench_array_insert_front,
    bench_array_remove_middle,
    bench_array_view_sort
);
criterion_main!(benches);
