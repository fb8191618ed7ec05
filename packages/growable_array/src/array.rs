use std::{cmp, mem, ptr, slice};

use tracing::trace;

use crate::{CapacityRequest, Error, OwningBuffer, Result};

/// A contiguous growable array that owns its elements.
///
/// The array owns one [`OwningBuffer`] at a time. The first [`len()`](Self::len) slots of the
/// buffer hold live elements; the remaining slots up to [`capacity()`](Self::capacity) are
/// unused storage that is never read.
///
/// # Growth
///
/// Every operation that needs more room than the current capacity allocates a new buffer of
/// `max(required, capacity * 2)` slots, moves the elements over and then replaces the old
/// buffer in a single step. A sequence of single-element insertions into an empty array
/// therefore sees capacities 1, 2, 4, 8, 16 and so on. Only [`reserve()`](Self::reserve) and
/// [`shrink_to_fit()`](Self::shrink_to_fit) set an exact capacity.
///
/// # Allocation failure
///
/// Operations without a `try_` prefix treat allocation failure like the standard collections
/// do: the allocation error handler is called (or the operation panics if the requested size
/// cannot even be expressed). The `try_` forms report [`Error::AllocationFailure`] instead and
/// leave the array unchanged.
///
/// # Examples
///
/// ```
/// use growable_array::GrowableArray;
///
/// let mut numbers = GrowableArray::new();
///
/// for n in 1..=9 {
///     numbers.push_back(n);
/// }
///
/// assert_eq!(numbers.len(), 9);
/// assert_eq!(numbers.capacity(), 16);
///
/// numbers.shrink_to_fit();
/// assert_eq!(numbers.capacity(), 9);
/// ```
pub struct GrowableArray<T> {
    buffer: OwningBuffer<T>,

    /// Number of live elements at the start of `buffer`. Never exceeds the buffer length.
    len: usize,
}

impl<T> GrowableArray<T> {
    /// Creates an empty array without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: OwningBuffer::empty(),
            len: 0,
        }
    }

    /// Creates an empty array with room for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).unwrap_or_else(|error| error.raise())
    }

    /// Creates an empty array with room for exactly `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the storage cannot be obtained.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            buffer: OwningBuffer::try_new(capacity)?,
            len: 0,
        })
    }

    /// Creates an empty array with the capacity named by a [`CapacityRequest`].
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    #[must_use]
    pub fn with_reserved(request: CapacityRequest) -> Self {
        Self::with_capacity(request.capacity())
    }

    /// Creates an array of `len` default values, with a capacity of exactly `len`.
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    #[must_use]
    pub fn with_default(len: usize) -> Self
    where
        T: Default,
    {
        Self::filled_with(len, T::default)
    }

    /// Creates an array of `len` copies of `value`, with a capacity of exactly `len`.
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    #[must_use]
    pub fn from_value(len: usize, value: &T) -> Self
    where
        T: Clone,
    {
        Self::filled_with(len, || value.clone())
    }

    /// Creates an array holding copies of `items` in order, with a capacity of exactly
    /// `items.len()`.
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    #[must_use]
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone,
    {
        let mut array = Self::with_capacity(items.len());
        array.append_range(items);
        array
    }

    fn filled_with(len: usize, mut make: impl FnMut() -> T) -> Self {
        let mut array = Self::with_capacity(len);

        for _ in 0..len {
            let value = make();

            // SAFETY: The array was created with room for `len` elements.
            unsafe {
                array.push_unchecked(value);
            }
        }

        array
    }

    /// Returns the number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of elements the array can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the largest number of elements an array of `T` could ever hold.
    #[must_use]
    pub fn max_size() -> usize {
        // Zero-sized elements take no space, so only the counter limits them.
        isize::MAX
            .unsigned_abs()
            .checked_div(size_of::<T>())
            .unwrap_or(usize::MAX)
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index` is not less than [`len()`](Self::len).
    pub fn at(&self, index: usize) -> Result<&T> {
        self.as_slice().get(index).ok_or(Error::OutOfRange {
            index,
            len: self.len,
        })
    }

    /// Returns the element at `index` for modification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index` is not less than [`len()`](Self::len).
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;

        self.as_mut_slice()
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// Returns the first element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the array is empty.
    pub fn front(&self) -> Result<&T> {
        self.at(0)
    }

    /// Returns the first element for modification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the array is empty.
    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.at_mut(0)
    }

    /// Returns the last element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the array is empty.
    pub fn back(&self) -> Result<&T> {
        self.at(self.last_index()?)
    }

    /// Returns the last element for modification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the array is empty.
    pub fn back_mut(&mut self) -> Result<&mut T> {
        let last = self.last_index()?;
        self.at_mut(last)
    }

    fn last_index(&self) -> Result<usize> {
        self.len
            .checked_sub(1)
            .ok_or(Error::OutOfRange { index: 0, len: 0 })
    }

    /// Returns the element at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len()`](Self::len).
    #[must_use]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);

        // SAFETY: Forwarding the caller's guarantee that `index` is in range.
        unsafe { self.as_slice().get_unchecked(index) }
    }

    /// Returns the element at `index` for modification, without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len()`](Self::len).
    #[must_use]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);

        // SAFETY: Forwarding the caller's guarantee that `index` is in range.
        unsafe { self.as_mut_slice().get_unchecked_mut(index) }
    }

    /// Returns the live elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The first `len` slots hold live values. The pointer is non-null and aligned
        // even when no block is owned, which is all a zero-length slice needs.
        unsafe { slice::from_raw_parts(self.buffer.as_ptr(), self.len) }
    }

    /// Returns the live elements as a mutable slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: As in `as_slice()`, and we hold the only reference to the buffer.
        unsafe { slice::from_raw_parts_mut(self.buffer.as_mut_ptr(), self.len) }
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Returns an iterator that allows modifying each element.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Returns a pointer to the first element slot.
    ///
    /// The pointer is dangling (but non-null and aligned) if the array owns no storage.
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.buffer.as_ptr()
    }

    /// Returns a mutable pointer to the first element slot.
    ///
    /// The pointer is dangling (but non-null and aligned) if the array owns no storage.
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buffer.as_mut_ptr()
    }

    /// Ensures the capacity is at least `capacity`, allocating exactly that much if it is not.
    ///
    /// Unlike [`Vec::reserve`], the argument is the total capacity wanted, not the number of
    /// additional elements. The length never changes.
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    pub fn reserve(&mut self, capacity: usize) {
        self.try_reserve(capacity).unwrap_or_else(|error| error.raise());
    }

    /// Ensures the capacity is at least `capacity`, allocating exactly that much if it is not.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the storage cannot be obtained. The array is
    /// unchanged in that case.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<()> {
        if capacity > self.capacity() {
            self.try_relocate(capacity)?;
        }

        Ok(())
    }

    /// Reduces the capacity to the current length.
    ///
    /// An empty array gives up its storage entirely.
    ///
    /// # Panics
    ///
    /// Does not panic in practice; the allocation error handler is called if the allocator
    /// refuses the smaller block.
    pub fn shrink_to_fit(&mut self) {
        self.try_shrink_to_fit().unwrap_or_else(|error| error.raise());
    }

    /// Reduces the capacity to the current length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the smaller block cannot be obtained. The array
    /// is unchanged in that case.
    pub fn try_shrink_to_fit(&mut self) -> Result<()> {
        if self.len < self.capacity() {
            self.try_relocate(self.len)?;
        }

        Ok(())
    }

    /// Changes the length to `len`.
    ///
    /// Shrinking drops the elements past `len` but keeps the capacity. Growing appends default
    /// values; if the capacity is insufficient it becomes `max(len, capacity * 2)`.
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    pub fn resize(&mut self, len: usize)
    where
        T: Default,
    {
        if len <= self.len {
            self.truncate_to(len);
            return;
        }

        if len > self.capacity() {
            let new_capacity = self.grown_capacity(len);
            self.try_relocate(new_capacity).unwrap_or_else(|error| error.raise());
        }

        while self.len < len {
            let value = T::default();

            // SAFETY: The capacity was checked or grown to at least `len` above.
            unsafe {
                self.push_unchecked(value);
            }
        }
    }

    /// Appends `value` at the end, growing the storage if it is full.
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    pub fn push_back(&mut self, value: T) {
        self.try_grow_for(1).unwrap_or_else(|error| error.raise());

        // SAFETY: There is room for at least one more element.
        unsafe {
            self.push_unchecked(value);
        }
    }

    /// Appends the value returned by `make` and returns a reference to it.
    ///
    /// Storage is grown before `make` is called, so the new value is written straight into its
    /// final slot.
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    pub fn emplace_back(&mut self, make: impl FnOnce() -> T) -> &mut T {
        self.try_grow_for(1).unwrap_or_else(|error| error.raise());

        let index = self.len;
        let value = make();

        // SAFETY: There is room for at least one more element.
        unsafe {
            self.push_unchecked(value);
        }

        // SAFETY: The element was just written at `index`, which is now below `len`.
        unsafe { self.get_unchecked_mut(index) }
    }

    /// Appends copies of `items` at the end, growing the storage at most once.
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    pub fn append_range(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.try_grow_for(items.len()).unwrap_or_else(|error| error.raise());

        for item in items {
            let value = item.clone();

            // SAFETY: Room for all of `items` was made above.
            unsafe {
                self.push_unchecked(value);
            }
        }
    }

    /// Inserts `value` at `index`, shifting all elements after it one position to the right.
    ///
    /// Returns the position of the inserted element, which is always `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than [`len()`](Self::len) or if the requested storage size
    /// overflows the address space.
    pub fn insert(&mut self, index: usize, value: T) -> usize {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );

        // Cannot underflow: checked above.
        let tail_len = len.wrapping_sub(index);

        if len < self.capacity() {
            // SAFETY: `index <= len < capacity`, so the position is inside the block.
            let gap = unsafe { self.buffer.as_mut_ptr().add(index) };

            // SAFETY: `index + 1 <= capacity`, at most one past the end of the block.
            let after_gap = unsafe { gap.add(1) };

            // SAFETY: Moves `[index, len)` to `[index + 1, len + 1)`, which fits because
            // `len < capacity`. `ptr::copy` allows the ranges to overlap.
            unsafe {
                ptr::copy(gap, after_gap, tail_len);
            }

            // SAFETY: The slot at `index` was vacated by the move above.
            unsafe {
                gap.write(value);
            }
        } else {
            self.insert_into_new_buffer(index, value);
        }

        // Cannot overflow: we just stored one more element in a block no larger than memory.
        self.len = len.wrapping_add(1);

        index
    }

    fn insert_into_new_buffer(&mut self, index: usize, value: T) {
        let len = self.len;
        let required = len
            .checked_add(1)
            .ok_or_else(|| Error::capacity_overflow(usize::MAX))
            .unwrap_or_else(|error| error.raise());

        let new_capacity = self.grown_capacity(required);
        let mut new_buffer = OwningBuffer::new(new_capacity);

        let source = self.buffer.as_ptr();
        let target = new_buffer.as_mut_ptr();

        // Cannot underflow: the caller checked `index <= len`.
        let tail_len = len.wrapping_sub(index);

        // SAFETY: Both blocks hold at least `index` slots and are distinct allocations.
        unsafe {
            ptr::copy_nonoverlapping(source, target, index);
        }

        // SAFETY: `index <= len`, inside or one past the end of the old block.
        let source_tail = unsafe { source.add(index) };

        // SAFETY: `index < len + 1 <= new_capacity`, inside the new block.
        let target_gap = unsafe { target.add(index) };

        // SAFETY: `index + 1 <= new_capacity`, at most one past the end of the new block.
        let target_tail = unsafe { target_gap.add(1) };

        // SAFETY: The old block holds `tail_len` live values from `index` and the new block has
        // room for them after the gap, since `len + 1 <= new_capacity`.
        unsafe {
            ptr::copy_nonoverlapping(source_tail, target_tail, tail_len);
        }

        // SAFETY: The gap slot is inside the new block and not yet initialized.
        unsafe {
            target_gap.write(value);
        }

        trace!(
            old_capacity = self.capacity(),
            new_capacity,
            len,
            index,
            "relocated elements around insertion point"
        );

        // The old block ends up in `new_buffer` with its values moved out; dropping it only
        // frees the memory.
        self.buffer.swap(&mut new_buffer);
    }

    /// Removes the element at `index`, shifting all elements after it one position to the left.
    ///
    /// Returns the position following the removed element. That is `index` again, which now
    /// holds the former next element or equals the new [`len()`](Self::len) if the removed
    /// element was the last one.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`len()`](Self::len).
    pub fn erase(&mut self, index: usize) -> usize {
        let len = self.len;
        assert!(
            index < len,
            "removal index (is {index}) should be < len (is {len})"
        );

        // SAFETY: `index < len`, so the position holds a live value.
        let hole = unsafe { self.buffer.as_mut_ptr().add(index) };

        // SAFETY: The slot holds a live value. The hole it leaves is filled below.
        let removed = unsafe { hole.read() };

        // SAFETY: `index + 1 <= len`, at most one past the last live value.
        let after_hole = unsafe { hole.add(1) };

        // Cannot underflow: `index < len`.
        let tail_len = len.wrapping_sub(index).wrapping_sub(1);

        // SAFETY: Moves `[index + 1, len)` to `[index, len - 1)`. The ranges may overlap.
        unsafe {
            ptr::copy(after_hole, hole, tail_len);
        }

        self.len = len.wrapping_sub(1);

        // Dropped last so that a panicking destructor leaves the array consistent.
        drop(removed);

        index
    }

    /// Removes the last element.
    ///
    /// Does nothing if the array owns no storage at all.
    ///
    /// # Panics
    ///
    /// Panics if the array owns storage but holds no elements. Calling this on an empty array
    /// is a contract violation, not a request that is quietly ignored.
    pub fn pop_back(&mut self) {
        if !self.buffer.is_allocated() {
            return;
        }

        assert!(self.len > 0, "pop_back() called on an empty array");

        self.truncate_to(self.len.wrapping_sub(1));
    }

    /// Removes all elements. The capacity is kept.
    pub fn clear(&mut self) {
        self.truncate_to(0);
    }

    /// Replaces the contents with `len` copies of `value`.
    ///
    /// If `len` exceeds the capacity, a new buffer of exactly `len` slots is allocated.
    /// Otherwise the existing storage is reused.
    ///
    /// # Panics
    ///
    /// Panics if the requested storage size overflows the address space.
    pub fn assign(&mut self, len: usize, value: &T)
    where
        T: Clone,
    {
        if len > self.capacity() {
            let mut fresh = Self::from_value(len, value);
            self.swap(&mut fresh);
            return;
        }

        let overwritten = cmp::min(len, self.len);

        for item in self.as_mut_slice().iter_mut().take(overwritten) {
            item.clone_from(value);
        }

        if len < self.len {
            self.truncate_to(len);
        }

        while self.len < len {
            let copy = value.clone();

            // SAFETY: `len <= capacity`, checked at the start.
            unsafe {
                self.push_unchecked(copy);
            }
        }
    }

    /// Exchanges the contents of two arrays without moving or copying any element.
    pub fn swap(&mut self, other: &mut Self) {
        self.buffer.swap(&mut other.buffer);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Makes this array a copy of `source`, sized to the capacity of `source`.
    ///
    /// The copy is built in separate storage and swapped in only when complete, so the array
    /// is left untouched if allocation fails or an element clone panics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the storage for the copy cannot be obtained.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<()>
    where
        T: Clone,
    {
        let mut copy = source.try_clone()?;
        self.swap(&mut copy);
        Ok(())
    }

    fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        let mut copy = Self::try_with_capacity(self.capacity())?;

        for item in self.as_slice() {
            let value = item.clone();

            // SAFETY: The copy has the same capacity as `self`, which fits all of its elements.
            unsafe {
                copy.push_unchecked(value);
            }
        }

        Ok(copy)
    }

    /// Makes sure there is room for `additional` more elements, applying the growth policy.
    pub(crate) fn try_grow_for(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or_else(|| Error::capacity_overflow(usize::MAX))?;

        if required > self.capacity() {
            self.try_relocate(self.grown_capacity(required))?;
        }

        Ok(())
    }

    fn grown_capacity(&self, required: usize) -> usize {
        cmp::max(required, self.capacity().saturating_mul(2))
    }

    /// Moves all elements into a new buffer of exactly `new_capacity` slots.
    fn try_relocate(&mut self, new_capacity: usize) -> Result<()> {
        debug_assert!(new_capacity >= self.len);

        let mut new_buffer = OwningBuffer::try_new(new_capacity)?;

        // SAFETY: Both blocks have room for `len` elements and are distinct allocations.
        unsafe {
            ptr::copy_nonoverlapping(self.buffer.as_ptr(), new_buffer.as_mut_ptr(), self.len);
        }

        trace!(
            old_capacity = self.capacity(),
            new_capacity,
            len = self.len,
            "relocated elements"
        );

        // The old block ends up in `new_buffer` with its values moved out; dropping it only
        // frees the memory.
        self.buffer.swap(&mut new_buffer);

        Ok(())
    }

    /// Writes `value` into the first unused slot.
    ///
    /// # Safety
    ///
    /// [`len()`](Self::len) must be less than [`capacity()`](Self::capacity).
    pub(crate) unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.capacity());

        // SAFETY: Forwarding the caller's guarantee that the slot exists.
        let slot = unsafe { self.buffer.slot_unchecked_mut(self.len) };
        slot.write(value);

        // Cannot overflow: `len < capacity`.
        self.len = self.len.wrapping_add(1);
    }

    /// Drops the elements from `len` onwards. Does nothing if `len` is not below the length.
    fn truncate_to(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        // Cannot underflow: checked above.
        let removed = self.len.wrapping_sub(len);

        // SAFETY: `len < self.len`, so the position holds a live value.
        let tail = unsafe { self.buffer.as_mut_ptr().add(len) };

        // Shortened first so a panicking destructor cannot lead to a double drop.
        self.len = len;

        // SAFETY: The `removed` values starting at `tail` were live and are no longer
        // reachable through the array.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(tail, removed));
        }
    }

    /// Hands the storage and the live element count to the caller, leaving the array empty
    /// without storage.
    pub(crate) fn take_storage(&mut self) -> (OwningBuffer<T>, usize) {
        let len = mem::replace(&mut self.len, 0);
        (mem::take(&mut self.buffer), len)
    }
}

impl<T> Drop for GrowableArray<T> {
    fn drop(&mut self) {
        self.truncate_to(0);
    }
}

impl<T> Default for GrowableArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for GrowableArray<T> {
    /// Copies the elements into storage sized to the capacity (not the length) of `self`.
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|error| error.raise())
    }

    fn clone_from(&mut self, source: &Self) {
        self.try_clone_from(source).unwrap_or_else(|error| error.raise());
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::cell::Cell;
    use std::fmt::Debug;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::{growable_array, reserve};

    assert_impl_all!(GrowableArray<u32>: Send, Sync, Debug, Default, Clone);
    assert_impl_all!(GrowableArray<String>: Send, Sync);
    assert_not_impl_any!(GrowableArray<Rc<u32>>: Send, Sync);

    /// Counts how many times any of its copies has been cloned.
    #[derive(Debug, PartialEq)]
    struct CloneCounter {
        value: i32,
        clones: Rc<Cell<usize>>,
    }

    impl Clone for CloneCounter {
        fn clone(&self) -> Self {
            self.clones.set(self.clones.get() + 1);

            Self {
                value: self.value,
                clones: Rc::clone(&self.clones),
            }
        }
    }

    /// Panics on clone once a shared budget of successful clones is used up.
    #[derive(Debug)]
    struct LimitedClone {
        value: i32,
        budget: Rc<Cell<usize>>,
    }

    impl Clone for LimitedClone {
        fn clone(&self) -> Self {
            let remaining = self.budget.get();
            assert!(remaining > 0, "clone budget exhausted");
            self.budget.set(remaining - 1);

            Self {
                value: self.value,
                budget: Rc::clone(&self.budget),
            }
        }
    }

    #[test]
    fn new_is_empty_without_storage() {
        let array = GrowableArray::<i32>::new();

        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
        assert!(array.is_empty());
    }

    #[test]
    fn with_default_fills_default_values() {
        for len in [0, 1, 5, 17] {
            let array = GrowableArray::<i32>::with_default(len);

            assert_eq!(array.len(), len);
            assert_eq!(array.capacity(), len);
            assert!(array.iter().all(|&item| item == 0));
        }

        let strings = GrowableArray::<String>::with_default(3);
        assert!(strings.iter().all(String::is_empty));
    }

    #[test]
    fn from_value_fills_copies() {
        for len in [0, 3, 10] {
            let array = GrowableArray::from_value(len, &42);

            assert_eq!(array.len(), len);
            assert_eq!(array.capacity(), len);
            assert!(array.iter().all(|&item| item == 42));
        }
    }

    #[test]
    fn from_slice_copies_in_order() {
        let array = GrowableArray::from_slice(&[1, 2, 3]);

        assert_eq!(array.len(), 3);
        assert_eq!(array.capacity(), 3);
        assert_eq!(array[2], 3);
        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn with_reserved_is_empty_with_capacity() {
        let array = GrowableArray::<String>::with_reserved(reserve(10));

        assert!(array.is_empty());
        assert_eq!(array.capacity(), 10);
    }

    #[test]
    fn try_with_capacity_reports_overflow() {
        let result = GrowableArray::<u64>::try_with_capacity(usize::MAX);

        assert!(matches!(result, Err(Error::AllocationFailure { .. })));
    }

    #[test]
    fn max_size_depends_on_element_size() {
        assert_eq!(
            GrowableArray::<u8>::max_size(),
            isize::MAX.unsigned_abs()
        );
        assert_eq!(
            GrowableArray::<u64>::max_size(),
            isize::MAX.unsigned_abs() / 8
        );
        assert_eq!(GrowableArray::<()>::max_size(), usize::MAX);
    }

    #[test]
    fn at_is_bounds_checked() {
        let mut array = GrowableArray::<i32>::with_default(3);

        assert!(ptr::eq(array.at(2).unwrap(), &array[2]));
        assert!(matches!(
            array.at(3),
            Err(Error::OutOfRange { index: 3, len: 3 })
        ));

        *array.at_mut(1).unwrap() = 5;
        assert_eq!(array[1], 5);
        assert!(matches!(
            array.at_mut(3),
            Err(Error::OutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn front_back_and_data() {
        let mut array = growable_array![1, 2, 3, 4, 5];

        assert_eq!(*array.front().unwrap(), 1);
        assert_eq!(*array.back().unwrap(), 5);
        assert_eq!(unsafe { *array.as_ptr() }, 1);

        *array.front_mut().unwrap() = 10;
        *array.back_mut().unwrap() = 50;

        assert_eq!(array.as_slice(), &[10, 2, 3, 4, 50]);
    }

    #[test]
    fn front_and_back_of_empty_are_out_of_range() {
        let mut array = GrowableArray::<i32>::with_capacity(4);

        assert!(matches!(array.front(), Err(Error::OutOfRange { .. })));
        assert!(matches!(array.back(), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            array.front_mut(),
            Err(Error::OutOfRange { index: 0, len: 0 })
        ));
        assert!(matches!(
            array.back_mut(),
            Err(Error::OutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn get_unchecked_reads_live_elements() {
        let mut array = growable_array![7, 8, 9];

        assert_eq!(unsafe { *array.get_unchecked(1) }, 8);

        unsafe {
            *array.get_unchecked_mut(2) = 90;
        }

        assert_eq!(array[2], 90);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut array = GrowableArray::<i32>::with_default(10);
        let old_capacity = array.capacity();

        array.clear();

        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), old_capacity);
    }

    #[test]
    fn resize_grows_with_defaults() {
        let mut array = GrowableArray::<i32>::with_default(3);
        array[2] = 17;

        array.resize(7);

        assert_eq!(array.len(), 7);
        assert!(array.capacity() >= array.len());
        assert_eq!(array[2], 17);
        assert_eq!(array[3], 0);
    }

    #[test]
    fn resize_shrinks_without_releasing_storage() {
        let mut array = GrowableArray::<i32>::with_default(3);
        array[0] = 42;
        array[1] = 55;
        let old_capacity = array.capacity();

        array.resize(2);

        assert_eq!(array.len(), 2);
        assert_eq!(array.capacity(), old_capacity);
        assert_eq!(array.as_slice(), &[42, 55]);
    }

    #[test]
    fn resize_refills_previously_used_slots_with_defaults() {
        let mut array = GrowableArray::<i32>::with_default(3);

        array.resize(8);
        array[3] = 42;
        array.resize(3);
        array.resize(5);

        assert_eq!(array[3], 0);
    }

    #[test]
    fn resize_past_capacity_applies_growth_policy() {
        // Doubling wins when it exceeds the requested length.
        let mut doubled = GrowableArray::<i32>::with_default(4);
        doubled.resize(5);
        assert_eq!(doubled.len(), 5);
        assert_eq!(doubled.capacity(), 8);

        // The requested length wins when it exceeds the doubled capacity.
        let mut exact = GrowableArray::<i32>::with_default(3);
        exact.resize(7);
        assert_eq!(exact.len(), 7);
        assert_eq!(exact.capacity(), 7);
    }

    #[test]
    fn resize_within_capacity_does_not_reallocate() {
        let mut array = GrowableArray::<i32>::with_capacity(10);
        let data = array.as_ptr();

        array.resize(6);

        assert_eq!(array.capacity(), 10);
        assert_eq!(array.as_ptr(), data);
        assert_eq!(array.as_slice(), &[0; 6]);
    }

    #[test]
    fn push_back_doubles_capacity() {
        let mut array = GrowableArray::new();
        let mut capacities = Vec::new();

        for value in 1..=17 {
            array.push_back(value);
            capacities.push(array.capacity());
        }

        assert_eq!(
            capacities,
            vec![1, 2, 4, 4, 8, 8, 8, 8, 16, 16, 16, 16, 16, 16, 16, 16, 32]
        );
        assert_eq!(array.as_slice(), (1..=17).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn push_back_nine_then_shrink() {
        let mut array = GrowableArray::new();

        for value in 1..=9 {
            array.push_back(value);
        }

        assert_eq!(array.len(), 9);
        assert_eq!(array.capacity(), 16);

        array.shrink_to_fit();

        assert_eq!(array.len(), 9);
        assert_eq!(array.capacity(), 9);
        assert_eq!(array.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn push_back_after_sized_keeps_existing() {
        let mut array = GrowableArray::<i32>::with_default(1);

        array.push_back(42);

        assert_eq!(array.len(), 2);
        assert!(array.capacity() >= array.len());
        assert_eq!(array.as_slice(), &[0, 42]);
    }

    #[test]
    fn push_back_with_spare_room_keeps_capacity() {
        let mut array = GrowableArray::<i32>::with_default(2);
        array.resize(1);
        let old_capacity = array.capacity();

        array.push_back(123);

        assert_eq!(array.len(), 2);
        assert_eq!(array.capacity(), old_capacity);
    }

    #[test]
    fn push_then_pop_restores_size_capacity_and_storage() {
        let mut array = growable_array![0, 1, 2, 3];
        array.reserve(8);
        let old_len = array.len();
        let old_capacity = array.capacity();
        let data = array.as_ptr();

        array.push_back(4);
        array.pop_back();

        assert_eq!(array.len(), old_len);
        assert_eq!(array.capacity(), old_capacity);
        assert_eq!(array.as_ptr(), data);
    }

    #[test]
    fn pop_back_keeps_storage() {
        let mut array = growable_array![0, 1, 2, 3];
        let old_capacity = array.capacity();
        let data = array.as_ptr();

        array.pop_back();

        assert_eq!(array.capacity(), old_capacity);
        assert_eq!(array.as_ptr(), data);
        assert_eq!(array, growable_array![0, 1, 2]);
    }

    #[test]
    fn pop_back_without_storage_is_no_op() {
        let mut array = GrowableArray::<i32>::new();

        array.pop_back();

        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
    }

    #[test]
    #[should_panic(expected = "pop_back() called on an empty array")]
    fn pop_back_on_empty_array_with_storage_panics() {
        let mut array = GrowableArray::<i32>::with_capacity(2);

        array.pop_back();
    }

    #[test]
    fn shrink_to_fit_is_idempotent() {
        let mut array = GrowableArray::with_capacity(32);
        array.append_range(&[1, 2, 3]);

        array.shrink_to_fit();
        let once = (array.len(), array.capacity(), array.as_ptr());

        array.shrink_to_fit();
        let twice = (array.len(), array.capacity(), array.as_ptr());

        assert_eq!(once, twice);
        assert_eq!(array.capacity(), 3);
    }

    #[test]
    fn shrink_to_fit_on_empty_releases_storage() {
        let mut array = GrowableArray::<String>::with_capacity(8);

        array.shrink_to_fit();

        assert_eq!(array.capacity(), 0);
    }

    #[test]
    fn reserve_allocates_exactly_and_never_shrinks() {
        let mut array = growable_array![1, 2];

        array.reserve(5);
        assert_eq!(array.capacity(), 5);
        assert_eq!(array.as_slice(), &[1, 2]);

        array.reserve(3);
        assert_eq!(array.capacity(), 5);
    }

    #[test]
    fn try_reserve_failure_leaves_array_unchanged() {
        let mut array = growable_array![1_u64, 2, 3];
        let data = array.as_ptr();

        let result = array.try_reserve(usize::MAX);

        assert!(matches!(result, Err(Error::AllocationFailure { .. })));
        assert_eq!(array.as_slice(), &[1, 2, 3]);
        assert_eq!(array.capacity(), 3);
        assert_eq!(array.as_ptr(), data);
    }

    #[test]
    fn emplace_back_returns_new_element() {
        let mut array = growable_array![String::from("a")];

        let added = array.emplace_back(|| String::from("b"));
        added.push('!');

        assert_eq!(array.as_slice(), &["a", "b!"]);
        assert_eq!(array.capacity(), 2);
    }

    #[test]
    fn append_range_grows_once() {
        let mut array = growable_array![1, 2];

        array.append_range(&[3, 4, 5, 6, 7]);

        assert_eq!(array.len(), 7);
        assert_eq!(array.capacity(), 7);
        assert_eq!(array.as_slice(), &[1, 2, 3, 4, 5, 6, 7]);

        array.append_range(&[8]);
        assert_eq!(array.capacity(), 14);

        array.append_range(&[]);
        assert_eq!(array.len(), 8);
    }

    #[test]
    fn insert_in_the_middle() {
        let mut array = growable_array![1, 2, 3, 4];

        let position = array.insert(2, 42);

        assert_eq!(position, 2);
        assert_eq!(array, growable_array![1, 2, 42, 3, 4]);
    }

    #[test]
    fn insert_with_spare_capacity_keeps_storage() {
        let mut array = GrowableArray::with_capacity(8);
        array.append_range(&[1, 2, 3]);
        let data = array.as_ptr();

        array.insert(0, 0);
        array.insert(4, 4);

        assert_eq!(array.as_ptr(), data);
        assert_eq!(array.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn insert_into_empty_allocates_one_slot() {
        let mut array = GrowableArray::new();

        array.insert(0, 'x');

        assert_eq!(array.len(), 1);
        assert_eq!(array.capacity(), 1);
        assert_eq!(array[0], 'x');
    }

    #[test]
    fn insert_into_full_array_doubles() {
        let mut array = growable_array![1, 2, 3];

        array.insert(1, 9);

        assert_eq!(array.capacity(), 6);
        assert_eq!(array.as_slice(), &[1, 9, 2, 3]);

        let mut at_end = growable_array![1, 2];
        at_end.insert(2, 3);
        assert_eq!(at_end.as_slice(), &[1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "insertion index (is 3) should be <= len (is 2)")]
    fn insert_past_end_panics() {
        let mut array = growable_array![1, 2];

        array.insert(3, 0);
    }

    #[test]
    fn insert_then_erase_restores_original() {
        let original = growable_array![10, 20, 30, 40, 50];

        for position in 0..=original.len() {
            let mut array = original.clone();

            array.insert(position, 99);
            array.erase(position);

            assert_eq!(array, original, "position {position}");
        }
    }

    #[test]
    fn erase_in_the_middle() {
        let mut array = growable_array![1, 2, 3, 4];

        let next = array.erase(2);

        assert_eq!(next, 2);
        assert_eq!(array[next], 4);
        assert_eq!(array, growable_array![1, 2, 4]);
        assert_eq!(array.capacity(), 4);
    }

    #[test]
    fn erase_last_returns_end() {
        let mut array = growable_array![1, 2, 3];

        let next = array.erase(2);

        assert_eq!(next, array.len());
        assert_eq!(array.as_slice(), &[1, 2]);
    }

    #[test]
    #[should_panic(expected = "removal index (is 3) should be < len (is 3)")]
    fn erase_at_end_panics() {
        let mut array = growable_array![1, 2, 3];

        array.erase(3);
    }

    #[test]
    fn assign_beyond_capacity_allocates_exactly() {
        let mut array = growable_array![1, 2];

        array.assign(5, &7);

        assert_eq!(array.as_slice(), &[7; 5]);
        assert_eq!(array.capacity(), 5);
    }

    #[test]
    fn assign_within_capacity_reuses_storage() {
        let mut array = GrowableArray::with_capacity(6);
        array.append_range(&[1, 2, 3, 4]);
        let data = array.as_ptr();

        array.assign(2, &9);
        assert_eq!(array.as_slice(), &[9, 9]);

        array.assign(6, &8);
        assert_eq!(array.as_slice(), &[8; 6]);

        assert_eq!(array.as_ptr(), data);
        assert_eq!(array.capacity(), 6);
    }

    #[test]
    fn clone_copies_capacity_and_elements_into_new_storage() {
        let mut numbers = GrowableArray::with_capacity(10);
        numbers.append_range(&[1, 2]);

        let copy = numbers.clone();

        assert_eq!(copy.len(), numbers.len());
        assert_eq!(copy.capacity(), 10);
        assert_ne!(copy.as_ptr(), numbers.as_ptr());

        for (a, b) in copy.iter().zip(numbers.iter()) {
            assert_eq!(a, b);
            assert!(!ptr::eq(a, b));
        }
    }

    #[test]
    fn clone_from_replaces_contents() {
        let source = growable_array![1, 2, 3, 4];
        let mut target = growable_array![1, 2, 3, 4, 5, 6];

        target.clone_from(&source);

        assert_eq!(target, source);
        assert_eq!(target.capacity(), source.capacity());
    }

    #[test]
    fn try_clone_from_failure_leaves_target_intact() {
        let budget = Rc::new(Cell::new(usize::MAX));
        let item = |value| LimitedClone {
            value,
            budget: Rc::clone(&budget),
        };

        let source: GrowableArray<_> = [item(1), item(2), item(3)].into();
        let mut target: GrowableArray<_> = [item(10), item(20)].into();
        let target_data = target.as_ptr();

        // The second element clone will panic.
        budget.set(1);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            target.clone_from(&source);
        }));

        let payload = result.unwrap_err();
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str));
        assert_eq!(message, Some("clone budget exhausted"));
        assert_eq!(target.len(), 2);
        assert_eq!(target.as_ptr(), target_data);
        assert_eq!(
            target.iter().map(|item| item.value).collect::<Vec<_>>(),
            vec![10, 20]
        );

        // The partially built copy was cleaned up, leaving only the five originals alive.
        assert_eq!(Rc::strong_count(&budget), 6);
    }

    #[test]
    fn take_leaves_source_valid_and_empty() {
        let mut source = growable_array![1, 2, 3];
        let data = source.as_ptr();

        let moved = mem::take(&mut source);

        assert_eq!(moved.as_ptr(), data);
        assert_eq!(moved.as_slice(), &[1, 2, 3]);
        assert!(source.is_empty());
        assert_eq!(source.capacity(), 0);

        source.push_back(4);
        assert_eq!(source.as_slice(), &[4]);
    }

    #[test]
    fn swap_exchanges_storage_without_copies() {
        let clones = Rc::new(Cell::new(0));
        let item = |value| CloneCounter {
            value,
            clones: Rc::clone(&clones),
        };

        let mut a: GrowableArray<_> = [item(42), item(666)].into();
        let mut b = GrowableArray::new();
        b.push_back(item(0));
        b.push_back(item(1));
        b.push_back(item(2));

        let (a_data, a_len, a_capacity) = (a.as_ptr(), a.len(), a.capacity());
        let (b_data, b_len, b_capacity) = (b.as_ptr(), b.len(), b.capacity());

        a.swap(&mut b);

        assert_eq!(b.as_ptr(), a_data);
        assert_eq!(a.as_ptr(), b_data);
        assert_eq!(a.len(), b_len);
        assert_eq!(b.len(), a_len);
        assert_eq!(a.capacity(), b_capacity);
        assert_eq!(b.capacity(), a_capacity);
        assert_eq!(a[2].value, 2);
        assert_eq!(b[1].value, 666);
        assert_eq!(clones.get(), 0);
    }

    #[test]
    fn growth_moves_instead_of_cloning() {
        let clones = Rc::new(Cell::new(0));
        let mut array = GrowableArray::new();

        for value in 0..100 {
            array.push_back(CloneCounter {
                value,
                clones: Rc::clone(&clones),
            });
        }

        let copy = array[50].clone();
        array.insert(0, copy);
        array.shrink_to_fit();
        array.reserve(500);

        assert_eq!(clones.get(), 1);
        assert_eq!(array.len(), 101);
    }

    #[test]
    fn every_element_is_dropped_exactly_once() {
        let tracker = Rc::new(());

        {
            let mut array = GrowableArray::new();

            for _ in 0..20 {
                array.push_back(Rc::clone(&tracker));
            }
            assert_eq!(Rc::strong_count(&tracker), 21);

            array.erase(3);
            array.pop_back();
            array.resize(15);
            assert_eq!(Rc::strong_count(&tracker), 16);

            array.insert(7, Rc::clone(&tracker));
            array.shrink_to_fit();
            array.assign(4, &tracker);
            assert_eq!(Rc::strong_count(&tracker), 5);

            array.clear();
            assert_eq!(Rc::strong_count(&tracker), 1);

            array.assign(40, &tracker);
            assert_eq!(Rc::strong_count(&tracker), 41);
        }

        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn elements_without_default_are_supported() {
        #[derive(Clone, Debug, PartialEq)]
        struct NoDefault(&'static str);

        let mut array = GrowableArray::new();
        array.push_back(NoDefault("b"));
        array.insert(0, NoDefault("a"));
        array.append_range(&[NoDefault("c")]);
        array.shrink_to_fit();
        array.erase(1);

        assert_eq!(array.as_slice(), &[NoDefault("a"), NoDefault("c")]);
    }

    #[test]
    fn zero_sized_elements() {
        let mut array = GrowableArray::new();

        for _ in 0..5 {
            array.push_back(());
        }
        array.insert(2, ());
        array.erase(0);

        assert_eq!(array.len(), 5);
        assert_eq!(array.capacity(), 8);

        array.shrink_to_fit();
        assert_eq!(array.capacity(), 5);
    }
}
