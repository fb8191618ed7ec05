//! Basic benchmarks for the `growable_array` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use growable_array::{GrowableArray, reserve};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = u64;
const TEST_VALUE: TestItem = 1024;
const FILL_COUNT: usize = 1000;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("growable_array_basic");

    let allocs_op = allocs.operation("build_empty");
    group.bench_function("build_empty", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(GrowableArray::<TestItem>::new()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_back_grow");
    group.bench_function("push_back_grow", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let mut array = GrowableArray::new();

                for _ in 0..FILL_COUNT {
                    array.push_back(black_box(TEST_VALUE));
                }

                drop(black_box(array));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_back_reserved");
    group.bench_function("push_back_reserved", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let mut array: GrowableArray<TestItem> = reserve(FILL_COUNT).into();

                for _ in 0..FILL_COUNT {
                    array.push_back(black_box(TEST_VALUE));
                }

                drop(black_box(array));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("append_range");
    group.bench_function("append_range", |b| {
        b.iter_custom(|iters| {
            let source = vec![TEST_VALUE; FILL_COUNT];

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let mut array = GrowableArray::new();
                array.append_range(black_box(&source));

                drop(black_box(array));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("insert_front");
    group.bench_function("insert_front", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| GrowableArray::from_value(FILL_COUNT, &TEST_VALUE))
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            for array in &mut arrays {
                array.reserve(FILL_COUNT + 1);
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                black_box(array.insert(0, black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("erase_front");
    group.bench_function("erase_front", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| GrowableArray::from_value(FILL_COUNT, &TEST_VALUE))
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                black_box(array.erase(0));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("clone");
    group.bench_function("clone", |b| {
        b.iter_custom(|iters| {
            let source = GrowableArray::from_value(FILL_COUNT, &TEST_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(source.clone()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("sum_by_index");
    group.bench_function("sum_by_index", |b| {
        b.iter_custom(|iters| {
            let array = GrowableArray::from_value(FILL_COUNT, &TEST_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let mut sum: TestItem = 0;

                for index in 0..array.len() {
                    sum = sum.wrapping_add(*array.at(index).unwrap());
                }

                black_box(sum);
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
