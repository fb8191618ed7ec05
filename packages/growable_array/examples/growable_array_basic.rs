//! Basic usage example for `GrowableArray`.
//!
//! This example shows how capacity evolves as elements are added, how to reserve room up front
//! and how checked access reports out-of-range positions.

use growable_array::{GrowableArray, growable_array, reserve};

fn main() {
    let mut numbers = GrowableArray::new();

    for value in 1..=9 {
        numbers.push_back(value);
        println!(
            "After pushing {value}: len = {}, capacity = {}",
            numbers.len(),
            numbers.capacity()
        );
    }

    numbers.shrink_to_fit();
    println!("After shrink_to_fit: capacity = {}", numbers.capacity());

    numbers.insert(0, 0);
    numbers.erase(5);
    println!("After insert and erase: {numbers:?}");

    match numbers.at(100) {
        Ok(value) => println!("Element 100 is {value}"),
        Err(error) => println!("Checked access failed: {error}"),
    }

    // Reserving room leaves the array empty but makes pushes free of allocation.
    let mut words: GrowableArray<String> = reserve(4).into();
    words.push_back("Tarzan".to_string());
    words.emplace_back(|| "Jane".to_string());
    println!("Words: {words:?} (capacity {})", words.capacity());

    let a = growable_array![1, 2, 3];
    let b = growable_array![1, 2, 4];
    println!("{a:?} < {b:?} is {}", a < b);

    let moved: Vec<_> = words.into_iter().collect();
    println!("Moved out of the array: {moved:?}");
}
