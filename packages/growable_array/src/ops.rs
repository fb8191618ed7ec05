//! Comparison, formatting and conversion traits for [`GrowableArray`].

use std::borrow::{Borrow, BorrowMut};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut};

use crate::GrowableArray;

impl<T: PartialEq> GrowableArray<T> {
    /// Returns `true` if every element of `self` equals the element at the same position of
    /// `other`, ignoring any extra elements at the end of `other`.
    ///
    /// This is a weaker test than `==`, which also requires equal lengths.
    ///
    /// ```
    /// use growable_array::growable_array;
    ///
    /// let short = growable_array![1, 2];
    /// let long = growable_array![1, 2, 3];
    ///
    /// assert!(short.prefix_eq(&long));
    /// assert!(!long.prefix_eq(&short));
    /// assert_ne!(short, long);
    /// ```
    #[must_use]
    pub fn prefix_eq(&self, other: &Self) -> bool {
        other.as_slice().starts_with(self.as_slice())
    }
}

impl<T: PartialEq> PartialEq for GrowableArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for GrowableArray<T> {}

impl<T: PartialOrd> PartialOrd for GrowableArray<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord> Ord for GrowableArray<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash> Hash for GrowableArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for GrowableArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T> Deref for GrowableArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for GrowableArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for GrowableArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for GrowableArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Borrow<[T]> for GrowableArray<T> {
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> BorrowMut<[T]> for GrowableArray<T> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize> From<[T; N]> for GrowableArray<T> {
    /// Moves the elements into an array with a capacity of exactly `N`.
    fn from(items: [T; N]) -> Self {
        let mut array = Self::with_capacity(N);

        for item in items {
            // SAFETY: The array was created with room for all `N` items.
            unsafe {
                array.push_unchecked(item);
            }
        }

        array
    }
}

impl<T: Clone> From<&[T]> for GrowableArray<T> {
    fn from(items: &[T]) -> Self {
        Self::from_slice(items)
    }
}

impl<T> From<Vec<T>> for GrowableArray<T> {
    /// Moves the elements into an array with a capacity of exactly `items.len()`.
    fn from(items: Vec<T>) -> Self {
        let mut array = Self::with_capacity(items.len());

        for item in items {
            // SAFETY: The array was created with room for every item of the vector.
            unsafe {
                array.push_unchecked(item);
            }
        }

        array
    }
}

impl<T> FromIterator<T> for GrowableArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T> Extend<T> for GrowableArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let items = iter.into_iter();
        let (lower_bound, _) = items.size_hint();

        self.try_grow_for(lower_bound).unwrap_or_else(|error| error.raise());

        for item in items {
            self.push_back(item);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for GrowableArray<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::nonminimal_bool,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::growable_array;

    #[test]
    fn comparisons_follow_lexicographic_order() {
        let a = growable_array![1, 2, 3];
        let b = growable_array![1, 2, 3];
        let c = growable_array![1, 2, 4];
        let short = growable_array![1, 2];

        assert!(a == b);
        assert!(a != c);
        assert!(a < c);
        assert!(a <= b);
        assert!(a <= c);
        assert!(c > a);
        assert!(b >= a);
        assert!(c >= a);
        assert!(short < a);
        assert!(!(a < short));
    }

    #[test]
    fn equality_requires_equal_lengths() {
        let short = growable_array![1, 2];
        let long = growable_array![1, 2, 3];

        assert_ne!(short, long);
        assert_ne!(long, short);
        assert!(short.prefix_eq(&long));
        assert!(!long.prefix_eq(&short));
        assert!(GrowableArray::<i32>::new().prefix_eq(&long));
    }

    #[test]
    fn equality_ignores_capacity() {
        let mut roomy = GrowableArray::with_capacity(10);
        roomy.append_range(&[1, 2]);

        assert_eq!(roomy, growable_array![1, 2]);
    }

    #[test]
    fn trichotomy_holds() {
        let samples = [
            growable_array![],
            growable_array![0],
            growable_array![0, 0],
            growable_array![0, 1],
            growable_array![1],
            growable_array![1, 0, 0],
        ];

        for a in &samples {
            for b in &samples {
                let relations = [a < b, a == b, a > b];
                assert_eq!(relations.iter().filter(|holds| **holds).count(), 1);
                assert_eq!(a < b, b > a);
                assert_eq!(a <= b, !(a > b));
                assert_eq!(a >= b, !(a < b));
            }
        }
    }

    #[test]
    fn equal_arrays_hash_equally() {
        let mut set = HashSet::new();
        set.insert(growable_array![1, 2, 3]);

        let mut roomy = GrowableArray::with_capacity(16);
        roomy.append_range(&[1, 2, 3]);

        assert!(set.contains(&roomy));
        assert!(!set.contains(&growable_array![1, 2]));
    }

    #[test]
    fn debug_formats_as_list() {
        assert_eq!(format!("{:?}", growable_array![1, 2, 3]), "[1, 2, 3]");
        assert_eq!(format!("{:?}", GrowableArray::<u8>::new()), "[]");
    }

    #[test]
    fn slice_access_through_deref() {
        let mut array = growable_array![3, 1, 2];

        array.sort_unstable();
        array[0] = 10;

        assert_eq!(&array[..], &[10, 2, 3]);
        assert!(array.contains(&2));
        assert_eq!(array.first(), Some(&10));
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn indexing_past_end_panics() {
        let array = growable_array![1, 2, 3];

        assert_eq!(array[3], 0);
    }

    #[test]
    fn from_vec_and_slice_size_capacity_to_len() {
        let from_vec = GrowableArray::from(vec![1, 2, 3]);
        assert_eq!(from_vec.capacity(), 3);

        let from_slice = GrowableArray::from(&[4, 5][..]);
        assert_eq!(from_slice.capacity(), 2);
        assert_eq!(from_slice.as_slice(), &[4, 5]);
    }

    #[test]
    fn collect_and_extend() {
        let mut array: GrowableArray<_> = (1..=5).collect();
        assert_eq!(array.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(array.capacity(), 5);

        array.extend([6, 7]);
        assert_eq!(array.capacity(), 10);

        array.extend(&[8, 9]);
        assert_eq!(array.len(), 9);
        assert_eq!(array[8], 9);
    }

    #[test]
    fn extend_with_unknown_length() {
        let mut array = GrowableArray::new();

        array.extend((0..100).filter(|n| n % 7 == 0));

        assert_eq!(array.len(), 15);
        assert_eq!(array.capacity(), 16);
    }
}
