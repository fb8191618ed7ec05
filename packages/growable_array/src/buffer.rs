use std::alloc::{self, Layout};
use std::any::type_name;
use std::mem::{self, MaybeUninit};
use std::ptr::NonNull;
use std::{fmt, slice};

use tracing::trace;

use crate::{Error, Result};

/// A fixed-size block of element slots with exactly one owner.
///
/// The buffer obtains all of its slots when it is created and never resizes itself. It knows
/// how many slots it owns but not which of them hold live values: slot liveness belongs to
/// whoever fills the slots (typically a [`GrowableArray`][crate::GrowableArray]). Dropping the
/// buffer frees the block without dropping any values stored in it.
///
/// The type is move-only. There is no `Clone` implementation, so a block can only ever be
/// freed once. Ownership of the block can be handed out with [`release()`](Self::release)
/// and taken back with [`from_raw()`](Self::from_raw).
///
/// # Examples
///
/// ```
/// use growable_array::OwningBuffer;
///
/// let mut buffer = OwningBuffer::<u64>::new(4);
/// assert!(buffer.is_allocated());
/// assert_eq!(buffer.len(), 4);
///
/// buffer.slots_mut()[0].write(42);
///
/// // SAFETY: Slot 0 was initialized above.
/// assert_eq!(unsafe { buffer.slots()[0].assume_init() }, 42);
/// ```
pub struct OwningBuffer<T> {
    /// First slot of the block. Dangling (but aligned) when no memory is owned.
    ptr: NonNull<MaybeUninit<T>>,

    /// Number of slots in the block. Zero when the buffer is empty.
    len: usize,
}

impl<T> OwningBuffer<T> {
    /// Creates a buffer that owns no block.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
        }
    }

    /// Allocates a block of `len` uninitialized slots.
    ///
    /// A `len` of zero produces an empty buffer without touching the allocator.
    ///
    /// # Panics
    ///
    /// Panics if the byte size of the block overflows the address space. Calls
    /// [`std::alloc::handle_alloc_error`] if the allocator refuses the request.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self::try_new(len).unwrap_or_else(|error| error.raise())
    }

    /// Allocates a block of `len` uninitialized slots, reporting failure as an error.
    ///
    /// A `len` of zero produces an empty buffer without touching the allocator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the block cannot be obtained.
    pub fn try_new(len: usize) -> Result<Self> {
        if len == 0 {
            return Ok(Self::empty());
        }

        let Ok(layout) = Layout::array::<T>(len) else {
            return Err(Error::capacity_overflow(len));
        };

        if layout.size() == 0 {
            // Zero-sized elements need no memory, only the slot count.
            return Ok(Self {
                ptr: NonNull::dangling(),
                len,
            });
        }

        // SAFETY: The layout has a non-zero size, checked above.
        let raw = unsafe { alloc::alloc(layout) };

        let ptr = NonNull::new(raw.cast::<MaybeUninit<T>>()).ok_or(Error::AllocationFailure {
            capacity: len,
            layout: Some(layout),
        })?;

        trace!(capacity = len, bytes = layout.size(), "allocated element block");

        Ok(Self { ptr, len })
    }

    /// Takes ownership of a block previously handed out by [`release()`](Self::release).
    ///
    /// No allocation takes place.
    ///
    /// # Safety
    ///
    /// The block must have been returned by [`release()`](Self::release) on an
    /// `OwningBuffer<T>` (with the same `T`) and must not be owned by anyone else. Values stored
    /// in the block are not dropped by the buffer.
    #[must_use]
    pub unsafe fn from_raw(block: NonNull<[MaybeUninit<T>]>) -> Self {
        Self {
            len: block.len(),
            ptr: block.cast::<MaybeUninit<T>>(),
        }
    }

    /// Gives up ownership of the block without freeing it, leaving the buffer empty.
    ///
    /// The caller becomes responsible for the returned block. The only way to free it is to
    /// hand it back to [`from_raw()`](Self::from_raw) and drop the resulting buffer.
    #[must_use = "the released block is leaked unless handed back to OwningBuffer::from_raw()"]
    pub fn release(&mut self) -> NonNull<[MaybeUninit<T>]> {
        let block = NonNull::slice_from_raw_parts(self.ptr, self.len);

        self.ptr = NonNull::dangling();
        self.len = 0;

        block
    }

    /// Exchanges the owned blocks of two buffers. No element is moved.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Returns the number of slots in the owned block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer owns no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the buffer owns a block.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        !self.is_empty()
    }

    /// Returns a pointer to the first slot.
    ///
    /// The pointer is dangling (but non-null and aligned) if the buffer is empty.
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr().cast_const().cast::<T>()
    }

    /// Returns a mutable pointer to the first slot.
    ///
    /// The pointer is dangling (but non-null and aligned) if the buffer is empty.
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr().cast::<T>()
    }

    /// Returns all slots of the block.
    #[must_use]
    pub fn slots(&self) -> &[MaybeUninit<T>] {
        // SAFETY: The pointer is valid for `len` slots (or dangling with `len == 0`), and
        // `MaybeUninit` places no requirement on the slot contents.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns all slots of the block for writing.
    #[must_use]
    pub fn slots_mut(&mut self) -> &mut [MaybeUninit<T>] {
        // SAFETY: As in `slots()`, and we hold the only reference to the block.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the slot at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len()`](Self::len).
    #[must_use]
    pub unsafe fn slot_unchecked(&self, index: usize) -> &MaybeUninit<T> {
        debug_assert!(index < self.len);

        // SAFETY: Forwarding the caller's guarantee that `index` is within the block.
        let slot = unsafe { self.ptr.add(index) };

        // SAFETY: The slot is inside the block and `MaybeUninit` accepts any contents.
        unsafe { slot.as_ref() }
    }

    /// Returns the slot at `index` for writing, without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len()`](Self::len).
    #[must_use]
    pub unsafe fn slot_unchecked_mut(&mut self, index: usize) -> &mut MaybeUninit<T> {
        debug_assert!(index < self.len);

        // SAFETY: Forwarding the caller's guarantee that `index` is within the block.
        let mut slot = unsafe { self.ptr.add(index) };

        // SAFETY: The slot is inside the block and we hold the only reference to it.
        unsafe { slot.as_mut() }
    }
}

impl<T> Drop for OwningBuffer<T> {
    fn drop(&mut self) {
        if self.len == 0 || size_of::<T>() == 0 {
            return;
        }

        // Cannot overflow: the same product was validated by `Layout::array` on allocation.
        let size = size_of::<T>().wrapping_mul(self.len);

        // SAFETY: The block was allocated with `Layout::array::<T>(len)`, which has exactly
        // this size and the alignment of `T`.
        let layout = unsafe { Layout::from_size_align_unchecked(size, align_of::<T>()) };

        // SAFETY: We own the block and it was allocated by the global allocator with `layout`.
        unsafe {
            alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout);
        }
    }
}

impl<T> Default for OwningBuffer<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for OwningBuffer<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

// SAFETY: The buffer owns its block exclusively, so sending it sends the (possible) values.
unsafe impl<T: Send> Send for OwningBuffer<T> {}

// SAFETY: Shared access only hands out shared slot references.
unsafe impl<T: Sync> Sync for OwningBuffer<T> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::fmt::Debug;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(OwningBuffer<u32>: Send, Sync, Debug, Default);
    assert_impl_all!(OwningBuffer<String>: Send, Sync);
    assert_not_impl_any!(OwningBuffer<u32>: Clone, Copy);
    assert_not_impl_any!(OwningBuffer<std::rc::Rc<u32>>: Send, Sync);

    #[test]
    fn zero_len_owns_nothing() {
        let buffer = OwningBuffer::<u64>::new(0);

        assert_eq!(buffer.len(), 0);
        assert!(buffer.is_empty());
        assert!(!buffer.is_allocated());
        assert!(buffer.slots().is_empty());
    }

    #[test]
    fn empty_and_default_are_the_same() {
        let a = OwningBuffer::<u64>::empty();
        let b = OwningBuffer::<u64>::default();

        assert!(!a.is_allocated());
        assert!(!b.is_allocated());
        assert_eq!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn new_owns_requested_slots() {
        let mut buffer = OwningBuffer::<u64>::new(8);

        assert_eq!(buffer.len(), 8);
        assert!(buffer.is_allocated());

        for (index, slot) in buffer.slots_mut().iter_mut().enumerate() {
            slot.write(index as u64 * 10);
        }

        for index in 0..8 {
            let value = unsafe { buffer.slot_unchecked(index).assume_init_read() };
            assert_eq!(value, index as u64 * 10);
        }
    }

    #[test]
    fn slot_unchecked_mut_writes_through() {
        let mut buffer = OwningBuffer::<u32>::new(3);

        unsafe {
            buffer.slot_unchecked_mut(2).write(99);
        }

        assert_eq!(unsafe { buffer.as_ptr().add(2).read() }, 99);
    }

    #[test]
    fn release_leaves_buffer_empty_and_from_raw_takes_it_back() {
        let mut buffer = OwningBuffer::<u32>::new(4);
        buffer.slots_mut()[3].write(7);
        let original_ptr = buffer.as_ptr();

        let block = buffer.release();

        assert!(!buffer.is_allocated());
        assert_eq!(buffer.len(), 0);
        assert_eq!(block.len(), 4);

        let restored = unsafe { OwningBuffer::from_raw(block) };

        assert_eq!(restored.len(), 4);
        assert_eq!(restored.as_ptr(), original_ptr);
        assert_eq!(unsafe { restored.slots()[3].assume_init() }, 7);
    }

    #[test]
    fn release_of_empty_buffer_is_empty_block() {
        let mut buffer = OwningBuffer::<u32>::empty();

        let block = buffer.release();

        assert_eq!(block.len(), 0);

        // Handing back an empty block is harmless.
        drop(unsafe { OwningBuffer::from_raw(block) });
    }

    #[test]
    fn swap_exchanges_blocks_without_moving_slots() {
        let mut a = OwningBuffer::<u8>::new(2);
        let mut b = OwningBuffer::<u8>::new(5);
        let a_ptr = a.as_ptr();
        let b_ptr = b.as_ptr();

        a.swap(&mut b);

        assert_eq!(a.len(), 5);
        assert_eq!(b.len(), 2);
        assert_eq!(a.as_ptr(), b_ptr);
        assert_eq!(b.as_ptr(), a_ptr);
    }

    #[test]
    fn swap_with_empty_moves_ownership() {
        let mut a = OwningBuffer::<u8>::new(3);
        let mut b = OwningBuffer::<u8>::empty();

        a.swap(&mut b);

        assert!(!a.is_allocated());
        assert!(b.is_allocated());
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn impossible_size_is_capacity_overflow() {
        let result = OwningBuffer::<u64>::try_new(usize::MAX);

        assert!(matches!(
            result,
            Err(Error::AllocationFailure {
                capacity: usize::MAX,
                layout: None
            })
        ));
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn impossible_size_panics_in_infallible_form() {
        drop(OwningBuffer::<u64>::new(usize::MAX));
    }

    #[test]
    fn zero_sized_elements_need_no_memory() {
        let buffer = OwningBuffer::<()>::new(1000);

        assert_eq!(buffer.len(), 1000);
        assert!(buffer.is_allocated());
        assert_eq!(buffer.slots().len(), 1000);
    }

    #[test]
    fn dropping_buffer_does_not_drop_slot_values() {
        use std::rc::Rc;

        let shared = Rc::new(5);

        let mut buffer = OwningBuffer::<Rc<i32>>::new(1);
        buffer.slots_mut()[0].write(Rc::clone(&shared));

        // Take the value back out before the buffer goes away; the buffer must not touch it.
        let value = unsafe { buffer.slots()[0].assume_init_read() };
        drop(buffer);

        assert_eq!(Rc::strong_count(&shared), 2);
        drop(value);
        assert_eq!(Rc::strong_count(&shared), 1);
    }
}
