use std::any::type_name;
use std::iter::FusedIterator;
use std::{fmt, ptr, slice};

use crate::{GrowableArray, OwningBuffer};

/// An iterator that moves the elements out of a [`GrowableArray`].
///
/// Created by the [`IntoIterator`] implementation of [`GrowableArray`]. The storage of the
/// array travels with the iterator and is freed when the iterator is dropped, together with
/// any elements that were not yet yielded.
///
/// # Examples
///
/// ```
/// use growable_array::growable_array;
///
/// let words = growable_array![String::from("first"), String::from("second")];
///
/// let mut iter = words.into_iter();
/// assert_eq!(iter.next().as_deref(), Some("first"));
/// assert_eq!(iter.len(), 1);
/// ```
pub struct IntoIter<T> {
    buffer: OwningBuffer<T>,

    // Slots in `next..end` hold values not yet yielded. Everything else is moved out.
    next: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    fn new(mut array: GrowableArray<T>) -> Self {
        let (buffer, len) = array.take_storage();

        Self {
            buffer,
            next: 0,
            end: len,
        }
    }

    /// Returns the elements not yet yielded as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `next <= end <= capacity`, so the offset is within or one past the block.
        let first = unsafe { self.buffer.as_ptr().add(self.next) };

        // SAFETY: The slots in `next..end` hold live values owned by the iterator.
        unsafe { slice::from_raw_parts(first, self.remaining()) }
    }

    fn remaining(&self) -> usize {
        // Cannot underflow: `next <= end` at all times.
        self.end.wrapping_sub(self.next)
    }

    /// Moves the value out of `index`.
    ///
    /// # Safety
    ///
    /// The slot must hold a live value that is never read again.
    unsafe fn read_slot(&self, index: usize) -> T {
        // SAFETY: Forwarding the caller's guarantee that the slot is in the block.
        let slot = unsafe { self.buffer.slot_unchecked(index) };

        // SAFETY: Forwarding the caller's guarantee that the slot is live and read once.
        unsafe { slot.assume_init_read() }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next == self.end {
            return None;
        }

        let index = self.next;

        // Cannot overflow: `next < end`.
        self.next = index.wrapping_add(1);

        // SAFETY: `index` was in `next..end` and is now outside it, so it is read only once.
        Some(unsafe { self.read_slot(index) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.next == self.end {
            return None;
        }

        // Cannot underflow: `end > next >= 0`.
        self.end = self.end.wrapping_sub(1);

        // SAFETY: `end` was in `next..end` and is now outside it, so it is read only once.
        Some(unsafe { self.read_slot(self.end) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: `next <= end <= capacity`, so the offset is within or one past the block.
        let first = unsafe { self.buffer.as_mut_ptr().add(self.next) };
        let remaining = ptr::slice_from_raw_parts_mut(first, self.remaining());

        // Emptied first so a panicking destructor cannot lead to a double drop.
        self.next = self.end;

        // SAFETY: The slots held live values owned by the iterator that can no longer be
        // reached through it. The buffer itself is freed afterwards by its own destructor.
        unsafe {
            ptr::drop_in_place(remaining);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("remaining", &self.as_slice())
            .finish()
    }
}

impl<T> IntoIterator for GrowableArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a GrowableArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T> IntoIterator for &'a mut GrowableArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::arithmetic_side_effects,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::growable_array;

    assert_impl_all!(IntoIter<u32>: Send, Sync, fmt::Debug, ExactSizeIterator, DoubleEndedIterator, FusedIterator);
    assert_not_impl_any!(IntoIter<Rc<u32>>: Send, Sync);

    #[test]
    fn yields_in_order() {
        let array = growable_array![1, 2, 3, 4];

        let collected: Vec<_> = array.into_iter().collect();

        assert_eq!(collected, vec![1, 2, 3, 4]);
    }

    #[test]
    fn yields_from_both_ends() {
        let mut iter = growable_array!['a', 'b', 'c', 'd'].into_iter();

        assert_eq!(iter.next_back(), Some('d'));
        assert_eq!(iter.next(), Some('a'));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.as_slice(), &['b', 'c']);
        assert_eq!(iter.next_back(), Some('c'));
        assert_eq!(iter.next_back(), Some('b'));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn yields_owned_values_in_reverse() {
        let array = growable_array![String::from("a"), String::from("b"), String::from("c")];

        let reversed: Vec<String> = array.into_iter().rev().collect();

        assert_eq!(reversed, ["c", "b", "a"]);
    }

    #[test]
    fn empty_array_yields_nothing() {
        let mut iter = GrowableArray::<String>::new().into_iter();

        assert_eq!(iter.size_hint(), (0, Some(0)));
        assert!(iter.next().is_none());
    }

    #[test]
    fn dropping_partially_consumed_iterator_drops_the_rest() {
        let tracker = Rc::new(());
        let mut array = GrowableArray::with_capacity(8);

        for _ in 0..5 {
            array.push_back(Rc::clone(&tracker));
        }

        let mut iter = array.into_iter();
        let first = iter.next();
        let last = iter.next_back();

        assert_eq!(Rc::strong_count(&tracker), 6);

        drop(iter);
        assert_eq!(Rc::strong_count(&tracker), 3);

        drop(first);
        drop(last);
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn zero_sized_elements() {
        let array = growable_array![(); 6];

        assert_eq!(array.into_iter().count(), 6);
    }

    #[test]
    fn borrowing_iteration() {
        let mut array = growable_array![1, 2, 3];

        for item in &mut array {
            *item *= 10;
        }

        let mut sum = 0;
        for item in &array {
            sum += *item;
        }

        assert_eq!(sum, 60);
    }

    #[test]
    fn debug_lists_remaining_elements() {
        let mut iter = growable_array![1, 2, 3].into_iter();
        iter.next();

        let text = format!("{iter:?}");

        assert!(text.contains("[2, 3]"));
    }
}
