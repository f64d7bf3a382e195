//! Raw allocators: direct pass-through to the system heap.
//!
//! Every pool in this crate obtains its chunks from a [`RawAllocator`]. The
//! trait is made of associated functions (no receiver) because a raw allocator
//! carries no state of its own; it only names *where* memory comes from.

use alloc::alloc::{Layout, alloc, dealloc, realloc};
use core::ptr::NonNull;

/// Alignment of every block handed out by this crate, in bytes.
pub const ALIGNMENT: usize = 8;

/// Rounds `size` up to the next multiple of [`ALIGNMENT`].
///
/// Returns `None` on overflow.
#[inline]
pub const fn align_up(size: usize) -> Option<usize> {
    match size.checked_add(ALIGNMENT - 1) {
        Some(padded) => Some(padded & !(ALIGNMENT - 1)),
        None => None,
    }
}

/// Rounds `n` up to the next power of two (`n` itself if it already is one).
///
/// Returns `None` on overflow.
#[inline]
pub const fn round_to_power_of_2(n: usize) -> Option<usize> {
    n.checked_next_power_of_two()
}

/// A source of raw, [`ALIGNMENT`]-aligned memory.
///
/// # Safety
///
/// Implementations must return blocks that are at least `size` bytes long,
/// aligned to [`ALIGNMENT`], and that stay valid until passed back to
/// [`RawAllocator::free`] or [`RawAllocator::realloc`].
pub unsafe trait RawAllocator {
    /// Allocates `size` bytes. Returns `None` when the heap is exhausted.
    fn malloc(size: usize) -> Option<NonNull<u8>>;

    /// Resizes a block previously returned by [`RawAllocator::malloc`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from this allocator and `old_size` must be the size it
    /// was allocated (or last reallocated) with.
    unsafe fn realloc(ptr: NonNull<u8>, old_size: usize, new_size: usize) -> Option<NonNull<u8>>;

    /// Frees a block.
    ///
    /// # Safety
    ///
    /// `ptr` must come from this allocator, `size` must be its current size,
    /// and the block must not be used afterwards.
    unsafe fn free(ptr: NonNull<u8>, size: usize);
}

/// The process heap, through `alloc::alloc`.
///
/// Zero-sized requests are served as one-byte blocks so that every returned
/// pointer is unique and freeable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SystemAllocator;

impl SystemAllocator {
    #[inline]
    fn layout(size: usize) -> Option<Layout> {
        Layout::from_size_align(size.max(1), ALIGNMENT).ok()
    }
}

unsafe impl RawAllocator for SystemAllocator {
    fn malloc(size: usize) -> Option<NonNull<u8>> {
        let layout = Self::layout(size)?;
        NonNull::new(unsafe { alloc(layout) })
    }

    unsafe fn realloc(ptr: NonNull<u8>, old_size: usize, new_size: usize) -> Option<NonNull<u8>> {
        let old_layout = Self::layout(old_size)?;
        // Validates that the new size is representable with our alignment.
        let new_layout = Self::layout(new_size)?;
        NonNull::new(unsafe { realloc(ptr.as_ptr(), old_layout, new_layout.size()) })
    }

    unsafe fn free(ptr: NonNull<u8>, size: usize) {
        // The block was allocated with this exact layout, so it is valid.
        let layout = unsafe { Layout::from_size_align_unchecked(size.max(1), ALIGNMENT) };
        unsafe { dealloc(ptr.as_ptr(), layout) }
    }
}
