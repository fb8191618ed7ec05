use crate::GrowableArray;

/// Asks for an array that has room for a number of elements but holds none yet.
///
/// This distinguishes "reserve room for `n` elements" from "create `n` default elements",
/// which would otherwise both be constructors taking a single number. Create one with
/// [`reserve()`] and convert it into a [`GrowableArray`].
///
/// # Examples
///
/// ```
/// use growable_array::{GrowableArray, reserve};
///
/// let array: GrowableArray<String> = reserve(16).into();
///
/// assert_eq!(array.len(), 0);
/// assert_eq!(array.capacity(), 16);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CapacityRequest {
    capacity: usize,
}

impl CapacityRequest {
    /// Creates a request for `capacity` element slots.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Returns the requested number of element slots.
    #[must_use]
    pub const fn capacity(self) -> usize {
        self.capacity
    }
}

/// Creates a [`CapacityRequest`] for `capacity` element slots.
#[must_use]
pub const fn reserve(capacity: usize) -> CapacityRequest {
    CapacityRequest::new(capacity)
}

impl<T> From<CapacityRequest> for GrowableArray<T> {
    fn from(request: CapacityRequest) -> Self {
        Self::with_reserved(request)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn reserve_wraps_capacity() {
        assert_eq!(reserve(7).capacity(), 7);
        assert_eq!(reserve(7), CapacityRequest::new(7));
    }

    #[test]
    fn converts_into_empty_array_with_capacity() {
        let array: GrowableArray<u8> = reserve(5).into();

        assert!(array.is_empty());
        assert_eq!(array.capacity(), 5);
    }

    #[test]
    fn zero_request_does_not_allocate() {
        let array = GrowableArray::<u8>::with_reserved(reserve(0));

        assert_eq!(array.capacity(), 0);
    }
}
