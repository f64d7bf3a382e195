//! Contiguous runs of elements stored in pool memory.
//!
//! [`RawSeq`] is the storage behind owned strings, arrays and objects. It
//! does not know which pool it lives in: every growing call takes the pool,
//! and [`RawSeq::release`] takes the pool type.

use core::cmp;
use core::marker::PhantomData;
use core::mem::{align_of, size_of};
use core::ptr::{self, NonNull};
use core::slice;

use jsonfx_alloc::{ALIGNMENT, AllocError, PoolAllocator, handle_alloc_failure};

/// Smallest capacity a run grows to on its first push.
const MIN_GROWTH: usize = 4;

pub(crate) struct RawSeq<T> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    _owns: PhantomData<T>,
}

impl<T> RawSeq<T> {
    pub(crate) const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            _owns: PhantomData,
        }
    }

    fn bytes(cap: usize) -> Result<usize, AllocError> {
        cap.checked_mul(size_of::<T>())
            .ok_or(AllocError::overflow(usize::MAX))
    }

    pub(crate) fn try_with_capacity<A: PoolAllocator>(
        cap: usize,
        pool: &A,
    ) -> Result<Self, AllocError> {
        const { assert!(align_of::<T>() <= ALIGNMENT) };
        if cap == 0 {
            return Ok(Self::new());
        }
        Ok(Self {
            ptr: pool.try_allocate(Self::bytes(cap)?)?.cast(),
            len: 0,
            cap,
            _owns: PhantomData,
        })
    }

    #[track_caller]
    pub(crate) fn with_capacity<A: PoolAllocator>(cap: usize, pool: &A) -> Self {
        Self::try_with_capacity(cap, pool).unwrap_or_else(|err| handle_alloc_failure(err))
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Makes room for `additional` more elements, growing through
    /// [`PoolAllocator::try_reallocate`] so that the most recent run of a
    /// bump pool grows in place. On error the run is unchanged.
    pub(crate) fn try_reserve<A: PoolAllocator>(
        &mut self,
        additional: usize,
        pool: &A,
    ) -> Result<(), AllocError> {
        let needed = self
            .len
            .checked_add(additional)
            .ok_or(AllocError::overflow(usize::MAX))?;
        if needed <= self.cap {
            return Ok(());
        }
        const { assert!(align_of::<T>() <= ALIGNMENT) };

        let new_cap = cmp::max(self.cap.saturating_mul(2), cmp::max(needed, MIN_GROWTH));
        let block = if self.cap == 0 {
            pool.try_allocate(Self::bytes(new_cap)?)?
        } else {
            unsafe {
                pool.try_reallocate(
                    self.ptr.cast(),
                    Self::bytes(self.cap)?,
                    Self::bytes(new_cap)?,
                )?
            }
        };
        self.ptr = block.cast();
        self.cap = new_cap;
        Ok(())
    }

    pub(crate) fn try_push<A: PoolAllocator>(&mut self, item: T, pool: &A) -> Result<(), AllocError> {
        self.try_reserve(1, pool)?;
        unsafe { self.ptr.as_ptr().add(self.len).write(item) };
        self.len += 1;
        Ok(())
    }

    #[track_caller]
    pub(crate) fn push<A: PoolAllocator>(&mut self, item: T, pool: &A) {
        if let Err(err) = self.try_push(item, pool) {
            handle_alloc_failure(err)
        }
    }

    /// Drops every element front to back, then hands the buffer back to the
    /// pool type. Leaves the run empty.
    ///
    /// # Safety
    ///
    /// The buffer must have been allocated from a pool of type `A`.
    pub(crate) unsafe fn release<A: PoolAllocator>(&mut self) {
        unsafe { ptr::drop_in_place(self.as_mut_slice()) };
        if self.cap > 0 {
            // The size was computed when the buffer was allocated.
            let size = self.cap * size_of::<T>();
            unsafe { A::deallocate(self.ptr.cast(), size) };
        }
        *self = Self::new();
    }
}

impl<T: Copy> RawSeq<T> {
    pub(crate) fn try_extend_from_slice<A: PoolAllocator>(
        &mut self,
        items: &[T],
        pool: &A,
    ) -> Result<(), AllocError> {
        self.try_reserve(items.len(), pool)?;
        unsafe {
            ptr::copy_nonoverlapping(items.as_ptr(), self.ptr.as_ptr().add(self.len), items.len());
        }
        self.len += items.len();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn extend_from_slice<A: PoolAllocator>(&mut self, items: &[T], pool: &A) {
        if let Err(err) = self.try_extend_from_slice(items, pool) {
            handle_alloc_failure(err)
        }
    }
}
