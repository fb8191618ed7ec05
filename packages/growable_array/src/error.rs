use std::alloc::{self, Layout};

use thiserror::Error;

/// Errors reported by [`GrowableArray`][crate::GrowableArray] and
/// [`OwningBuffer`][crate::OwningBuffer].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A bounds-checked accessor was asked for a position that holds no live element.
    #[error("index {index} is out of range for an array of length {len}")]
    OutOfRange {
        /// The requested position.
        index: usize,

        /// The logical length of the array at the time of the request.
        len: usize,
    },

    /// Storage for the requested number of elements could not be obtained.
    #[error("failed to allocate storage for {capacity} elements{}", describe_layout(.layout))]
    AllocationFailure {
        /// The number of element slots that was requested.
        capacity: usize,

        /// The memory layout the allocator refused, or `None` if the byte size of the
        /// requested block does not fit in the address space.
        layout: Option<Layout>,
    },
}

impl Error {
    pub(crate) fn capacity_overflow(capacity: usize) -> Self {
        Self::AllocationFailure {
            capacity,
            layout: None,
        }
    }

    /// Reports an allocation failure from an infallible operation the same way the standard
    /// collections do: through the allocation error handler if the allocator refused a valid
    /// layout, by panicking otherwise.
    #[cfg_attr(test, mutants::skip)] // Diverges; every mutation either aborts or panics.
    pub(crate) fn raise(self) -> ! {
        match self {
            Self::AllocationFailure {
                layout: Some(layout),
                ..
            } => alloc::handle_alloc_error(layout),
            other => panic!("{other}"),
        }
    }
}

#[allow(
    clippy::ref_option,
    reason = "thiserror passes fields to format arguments by reference"
)]
fn describe_layout(layout: &Option<Layout>) -> String {
    layout.map_or_else(
        || ": capacity overflow".to_owned(),
        |layout| format!(" ({} bytes, align {})", layout.size(), layout.align()),
    )
}

/// A specialized `Result` type for array operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn out_of_range_names_index_and_len() {
        let error = Error::OutOfRange { index: 3, len: 3 };

        assert_eq!(
            error.to_string(),
            "index 3 is out of range for an array of length 3"
        );
    }

    #[test]
    fn allocation_failure_with_layout_names_bytes() {
        let layout = Layout::array::<u64>(4).unwrap();
        let error = Error::AllocationFailure {
            capacity: 4,
            layout: Some(layout),
        };

        assert_eq!(
            error.to_string(),
            "failed to allocate storage for 4 elements (32 bytes, align 8)"
        );
    }

    #[test]
    fn allocation_failure_without_layout_is_capacity_overflow() {
        let error = Error::capacity_overflow(usize::MAX);

        assert!(error.to_string().ends_with("capacity overflow"));
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn raise_without_layout_panics() {
        Error::capacity_overflow(usize::MAX).raise();
    }
}
