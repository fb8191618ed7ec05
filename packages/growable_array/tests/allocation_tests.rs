//! Verifies which array operations touch the allocator and which do not.

#![cfg(not(miri))] // Miri replaces the global allocator, so cannot be used here.

use std::hint::black_box;
use std::mem;

use alloc_tracker::{Allocator, Session};
use growable_array::{GrowableArray, growable_array, reserve};

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

#[test]
fn new_and_empty_conversions_do_not_allocate() {
    let session = Session::new();

    let total = {
        let op = session.operation("create_empty");
        {
            let _span = op.measure_thread();

            black_box(GrowableArray::<u64>::new());
            black_box(GrowableArray::<u64>::with_default(0));
            black_box(GrowableArray::<u64>::from(reserve(0)));
            black_box(growable_array![(); 1000]);
        }
        op.total_bytes_allocated()
    };

    assert_eq!(total, 0);
}

#[test]
fn reserve_allocates_the_requested_block() {
    let session = Session::new();

    let total = {
        let op = session.operation("reserve");
        {
            let _span = op.measure_thread();

            let array: GrowableArray<u64> = reserve(100).into();
            black_box(&array);
        }
        op.total_bytes_allocated()
    };

    assert_eq!(total, 800);
}

#[test]
fn operations_within_capacity_do_not_allocate() {
    let session = Session::new();

    let mut array = GrowableArray::<u64>::with_capacity(64);
    let mut other = growable_array![1, 2, 3];

    let total = {
        let op = session.operation("within_capacity");
        {
            let _span = op.measure_thread();

            for value in 0..32 {
                array.push_back(value);
            }
            array.insert(0, 99);
            array.erase(5);
            array.pop_back();
            array.resize(40);
            array.assign(64, &7);
            array.swap(&mut other);
            array.clear();

            let moved = mem::take(&mut other);
            black_box(&moved);
            other = moved;
        }
        op.total_bytes_allocated()
    };

    assert_eq!(total, 0);
    assert_eq!(other.len(), 64);
}

#[test]
fn growth_allocates_doubling_blocks() {
    let session = Session::new();

    let total = {
        let op = session.operation("grow_to_eight");
        {
            let _span = op.measure_thread();

            let mut array = GrowableArray::<u64>::new();
            for value in 0..8 {
                array.push_back(value);
            }
            black_box(&array);
        }
        op.total_bytes_allocated()
    };

    // Blocks of 1, 2, 4 and 8 elements.
    assert_eq!(total, (1 + 2 + 4 + 8) * 8);
}

#[test]
fn clone_allocates_source_capacity() {
    let session = Session::new();

    let mut source = GrowableArray::<u64>::with_capacity(10);
    source.push_back(1);

    let total = {
        let op = session.operation("clone");
        {
            let _span = op.measure_thread();

            black_box(source.clone());
        }
        op.total_bytes_allocated()
    };

    assert_eq!(total, 80);
}
