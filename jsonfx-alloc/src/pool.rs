//! The pool capability every value is generic over, and the non-pooling adapter.

use alloc::alloc::handle_alloc_error;
use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::error::{AllocError, AllocErrorKind};
use crate::raw::{RawAllocator, SystemAllocator};
use crate::stats::PoolStats;

/// A memory pool that values allocate their strings, arrays and objects from.
///
/// Allocation takes `&self`: a pool is shared by every value built in it, and
/// implementations use interior mutability for their bookkeeping. Pools are
/// confined to one thread.
///
/// Whether a pool reclaims individual blocks is a property of its type, given
/// by [`PoolAllocator::NEEDS_FREE`]. Value teardown consults it once and skips
/// the whole release walk when it is `false`.
pub trait PoolAllocator {
    /// `true` if blocks must be handed back through
    /// [`PoolAllocator::deallocate`]; `false` for arenas that free everything
    /// at once.
    const NEEDS_FREE: bool;

    /// Allocates `size` bytes aligned to [`ALIGNMENT`](crate::ALIGNMENT).
    fn try_allocate(&self, size: usize) -> Result<NonNull<u8>, AllocError>;

    /// Allocates `size` bytes aligned to [`ALIGNMENT`](crate::ALIGNMENT).
    ///
    /// # Panics
    ///
    /// Panics when the request exceeds what the pool accepts. Heap exhaustion
    /// goes through [`handle_alloc_error`].
    #[track_caller]
    fn allocate(&self, size: usize) -> NonNull<u8> {
        match self.try_allocate(size) {
            Ok(ptr) => ptr,
            Err(err) => handle_alloc_failure(err),
        }
    }

    /// Grows or keeps a block. The returned block holds the first
    /// `min(old_size, new_size)` bytes of the old one.
    ///
    /// # Safety
    ///
    /// `ptr` must come from this pool and `old_size` must be the size it was
    /// last allocated or reallocated with. If the returned pointer differs
    /// from `ptr`, the old block must not be used again.
    unsafe fn try_reallocate(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError>;

    /// Infallible counterpart of [`PoolAllocator::try_reallocate`].
    ///
    /// # Safety
    ///
    /// Same contract as [`PoolAllocator::try_reallocate`].
    #[track_caller]
    unsafe fn reallocate(&self, ptr: NonNull<u8>, old_size: usize, new_size: usize) -> NonNull<u8> {
        match unsafe { self.try_reallocate(ptr, old_size, new_size) } {
            Ok(ptr) => ptr,
            Err(err) => handle_alloc_failure(err),
        }
    }

    /// Hands a block back. A no-op for arenas.
    ///
    /// # Safety
    ///
    /// `ptr` must come from a pool of this type, `size` must be its current
    /// size, and the block must not be used again.
    unsafe fn deallocate(ptr: NonNull<u8>, size: usize);

    /// Frees every chunk the pool owns. The pool stays usable.
    fn destroy(&mut self);

    /// Current occupancy.
    fn stats(&self) -> PoolStats {
        PoolStats::default()
    }
}

/// Reports a failed allocation the way the infallible pool methods do.
///
/// Exhaustion goes through [`handle_alloc_error`]; refused and overflowing
/// requests panic with the error message.
#[cold]
#[track_caller]
pub fn handle_alloc_failure(err: AllocError) -> ! {
    match err.kind {
        AllocErrorKind::Exhausted => handle_alloc_error(err.layout()),
        AllocErrorKind::Oversized { .. } | AllocErrorKind::CapacityOverflow => panic!("{err}"),
    }
}

/// A pool that forwards every call to a [`RawAllocator`].
///
/// Blocks are freed one by one, so [`PoolAllocator::NEEDS_FREE`] is `true` and
/// values release their storage when dropped.
pub struct PassthroughPool<R: RawAllocator = SystemAllocator> {
    _raw: PhantomData<R>,
}

impl<R: RawAllocator> PassthroughPool<R> {
    /// Creates the adapter.
    pub const fn new() -> Self {
        Self { _raw: PhantomData }
    }
}

impl<R: RawAllocator> Default for PassthroughPool<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RawAllocator> core::fmt::Debug for PassthroughPool<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PassthroughPool").finish()
    }
}

impl<R: RawAllocator> PoolAllocator for PassthroughPool<R> {
    const NEEDS_FREE: bool = true;

    #[inline]
    fn try_allocate(&self, size: usize) -> Result<NonNull<u8>, AllocError> {
        R::malloc(size).ok_or(AllocError::exhausted(size))
    }

    #[inline]
    unsafe fn try_reallocate(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        unsafe { R::realloc(ptr, old_size, new_size) }.ok_or(AllocError::exhausted(new_size))
    }

    #[inline]
    unsafe fn deallocate(ptr: NonNull<u8>, size: usize) {
        unsafe { R::free(ptr, size) }
    }

    fn destroy(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_round_trip() {
        let pool = PassthroughPool::<SystemAllocator>::new();
        let ptr = pool.allocate(16);
        unsafe {
            ptr.as_ptr().write_bytes(7, 16);
            let grown = pool.reallocate(ptr, 16, 128);
            assert_eq!(*grown.as_ptr().add(15), 7);
            PassthroughPool::<SystemAllocator>::deallocate(grown, 128);
        }
        assert_eq!(pool.stats(), PoolStats::default());
    }

    #[test]
    fn passthrough_needs_free() {
        const { assert!(<PassthroughPool as PoolAllocator>::NEEDS_FREE) };
    }
}
