#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A growable contiguous array with explicit capacity control.
//!
//! The crate is built from two layers:
//!
//! * [`OwningBuffer<T>`] is a fixed-size block of uninitialized element slots with exactly one
//!   owner. It allocates once, frees once and never looks at what is stored in it.
//! * [`GrowableArray<T>`] keeps a logical length on top of one such buffer and takes care of
//!   element lifetimes, growth and relocation.
//!
//! Growth is geometric: whenever an operation needs more room than the current capacity, the
//! new capacity is the larger of the required size and twice the old capacity. Elements are
//! moved into the new block, never cloned.
//!
//! # Examples
//!
//! ```
//! use growable_array::{GrowableArray, growable_array, reserve};
//!
//! // Room for 10 elements, none created yet.
//! let mut names: GrowableArray<String> = reserve(10).into();
//! assert_eq!(names.len(), 0);
//! assert_eq!(names.capacity(), 10);
//!
//! names.push_back("Tarzan".to_string());
//! names.insert(0, "Jane".to_string());
//! assert_eq!(names.as_slice(), &["Jane", "Tarzan"]);
//!
//! // Five default values; the capacity matches the length.
//! let zeros = GrowableArray::<u32>::with_default(5);
//! assert_eq!(zeros.capacity(), 5);
//!
//! // Arrays compare lexicographically.
//! assert!(growable_array![1, 2] < growable_array![1, 3]);
//! ```
//!
//! # Checked access
//!
//! Indexing (`array[i]`) panics on an out-of-range position, just like slices do. The
//! [`at()`](GrowableArray::at), [`front()`](GrowableArray::front) and
//! [`back()`](GrowableArray::back) accessors report [`Error::OutOfRange`] instead.
//!
//! ```
//! use growable_array::{Error, growable_array};
//!
//! let numbers = growable_array![1, 2, 3];
//!
//! assert_eq!(*numbers.at(1).unwrap(), 2);
//! assert!(matches!(numbers.at(3), Err(Error::OutOfRange { index: 3, len: 3 })));
//! ```

mod array;
mod buffer;
mod capacity;
mod error;
mod into_iter;
mod ops;

pub use array::GrowableArray;
pub use buffer::OwningBuffer;
pub use capacity::*;
pub use error::Error;
pub use into_iter::IntoIter;

pub(crate) use error::Result;

/// Creates a [`GrowableArray`] holding the given elements.
///
/// The resulting capacity always equals the number of elements.
///
/// ```
/// use growable_array::growable_array;
///
/// let empty: growable_array::GrowableArray<u8> = growable_array![];
/// assert!(empty.is_empty());
///
/// let listed = growable_array![1, 2, 3];
/// assert_eq!(listed.capacity(), 3);
///
/// let repeated = growable_array!["x"; 4];
/// assert_eq!(repeated.as_slice(), &["x", "x", "x", "x"]);
/// ```
#[macro_export]
macro_rules! growable_array {
    () => {
        $crate::GrowableArray::new()
    };

    ($value:expr; $len:expr) => {
        $crate::GrowableArray::from_value($len, &$value)
    };

    ($($item:expr),+ $(,)?) => {
        $crate::GrowableArray::from([$($item),+])
    };
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn macro_forms() {
        let empty: GrowableArray<i32> = growable_array![];
        assert_eq!(empty.capacity(), 0);

        let repeated = growable_array![7; 3];
        assert_eq!(repeated.as_slice(), &[7, 7, 7]);

        let listed = growable_array![1, 2, 3,];
        assert_eq!(listed.as_slice(), &[1, 2, 3]);
        assert_eq!(listed.capacity(), 3);
    }
}
