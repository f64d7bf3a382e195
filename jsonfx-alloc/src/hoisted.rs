//! Bump pool that keeps the current cursor in the pool itself.
//!
//! Chunk headers only carry the link and the chunk size; the cursor and the
//! remaining byte count of the current chunk live in the pool, so the hot
//! path never touches chunk memory. Occupancy is kept as running totals.

use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;
use core::mem::size_of;
use core::ptr::{self, NonNull};

use crate::config::{BigAllocPolicy, PoolConfig, ReleasePolicy};
use crate::error::{AllocError, ConfigError};
use crate::pool::PoolAllocator;
use crate::raw::{RawAllocator, SystemAllocator, align_up, round_to_power_of_2};
use crate::stats::PoolStats;
use crate::tracing_macros::{debug, trace};

#[repr(C)]
struct ChunkInfo {
    next: Option<NonNull<ChunkInfo>>,
    capacity: usize,
}

/// A bump pool with the current chunk's cursor hoisted out of the chunk.
pub struct HoistedPool<R: RawAllocator = SystemAllocator> {
    cursor: Cell<*mut u8>,
    remain: Cell<usize>,
    head: Cell<Option<NonNull<ChunkInfo>>>,
    totals: Cell<PoolStats>,
    config: PoolConfig,
    _raw: PhantomData<R>,
}

impl<R: RawAllocator> HoistedPool<R> {
    /// Bytes taken by the header at the start of every chunk.
    pub const HEADER_SIZE: usize = size_of::<ChunkInfo>();

    /// Creates a pool with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates a pool with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration does not validate.
    #[track_caller]
    pub fn with_config(config: PoolConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(pool) => pool,
            Err(err) => panic!("invalid pool configuration: {err}"),
        }
    }

    /// Creates a pool with the given configuration, if it validates.
    pub fn try_with_config(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate(Self::HEADER_SIZE)?;
        Ok(Self {
            cursor: Cell::new(ptr::null_mut()),
            remain: Cell::new(0),
            head: Cell::new(None),
            totals: Cell::new(PoolStats::default()),
            config,
            _raw: PhantomData,
        })
    }

    /// The configuration this pool was built with.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of chunks currently owned.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.totals.get().chunk_count
    }

    /// Bytes left in the current chunk; zero before the first allocation.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remain.get()
    }

    fn record(&self, update: impl FnOnce(&mut PoolStats)) {
        let mut totals = self.totals.get();
        update(&mut totals);
        self.totals.set(totals);
    }

    fn new_chunk(&self, capacity: usize, size: usize) -> Result<NonNull<ChunkInfo>, AllocError> {
        let base = R::malloc(capacity).ok_or(AllocError::exhausted(size))?;
        let chunk = base.cast::<ChunkInfo>();
        unsafe {
            chunk.as_ptr().write(ChunkInfo {
                next: None,
                capacity,
            });
        }
        self.record(|t| {
            t.chunk_count += 1;
            t.bytes_reserved += capacity;
        });
        Ok(chunk)
    }

    /// Links `chunk` at the head and points the cursor at its free space,
    /// minus the `aligned` bytes handed out from its front.
    fn make_current(&self, chunk: NonNull<ChunkInfo>, aligned: usize) -> NonNull<u8> {
        unsafe {
            (*chunk.as_ptr()).next = self.head.get();
            let block = chunk.cast::<u8>().add(Self::HEADER_SIZE);
            self.cursor.set(block.as_ptr().add(aligned));
            self.remain
                .set(chunk.as_ref().capacity - Self::HEADER_SIZE - aligned);
            self.head.set(Some(chunk));
            self.record(|t| t.bytes_used += aligned);
            block
        }
    }

    fn allocate_big(&self, size: usize, aligned: usize) -> Result<NonNull<u8>, AllocError> {
        let exact = aligned
            .checked_add(Self::HEADER_SIZE)
            .ok_or(AllocError::overflow(size))?;
        let rounded = round_to_power_of_2(exact).ok_or(AllocError::overflow(size))?;

        let block = match self.head.get() {
            Some(current) if rounded - exact <= self.remain.get() => {
                let chunk = self.new_chunk(exact, size)?;
                unsafe {
                    (*chunk.as_ptr()).next = current.as_ref().next;
                    (*current.as_ptr()).next = Some(chunk);
                }
                self.record(|t| t.bytes_used += aligned);
                debug!(size, capacity = exact, "spliced big chunk behind the current chunk");
                unsafe { chunk.cast::<u8>().add(Self::HEADER_SIZE) }
            }
            _ => {
                let chunk = self.new_chunk(rounded, size)?;
                debug!(size, capacity = rounded, "big chunk became the current chunk");
                self.make_current(chunk, aligned)
            }
        };
        self.record(|t| t.big_chunk_count += 1);
        Ok(block)
    }
}

impl<R: RawAllocator> Default for HoistedPool<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RawAllocator> PoolAllocator for HoistedPool<R> {
    const NEEDS_FREE: bool = false;

    fn try_allocate(&self, size: usize) -> Result<NonNull<u8>, AllocError> {
        let aligned = align_up(size).ok_or(AllocError::overflow(size))?;
        if let Some(cursor) = NonNull::new(self.cursor.get())
            && aligned <= self.remain.get()
        {
            self.cursor.set(unsafe { cursor.as_ptr().add(aligned) });
            self.remain.set(self.remain.get() - aligned);
            self.record(|t| t.bytes_used += aligned);
            return Ok(cursor);
        }

        let usable = self.config.chunk_capacity - Self::HEADER_SIZE;
        if aligned > usable {
            return match self.config.big_alloc {
                BigAllocPolicy::Disabled => Err(AllocError::oversized(size, usable)),
                BigAllocPolicy::Enabled => self.allocate_big(size, aligned),
            };
        }

        let chunk = self.new_chunk(self.config.chunk_capacity, size)?;
        trace!(capacity = self.config.chunk_capacity, "added chunk");
        Ok(self.make_current(chunk, aligned))
    }

    unsafe fn try_reallocate(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        if new_size <= old_size {
            return Ok(ptr);
        }
        let old_aligned = align_up(old_size).ok_or(AllocError::overflow(old_size))?;
        let new_aligned = align_up(new_size).ok_or(AllocError::overflow(new_size))?;
        let increment = new_aligned - old_aligned;

        let cursor = self.cursor.get();
        if !cursor.is_null()
            && ptr.as_ptr().wrapping_add(old_aligned) == cursor
            && increment <= self.remain.get()
        {
            self.cursor.set(unsafe { cursor.add(increment) });
            self.remain.set(self.remain.get() - increment);
            self.record(|t| t.bytes_used += increment);
            trace!(old_size, new_size, "grew block in place");
            return Ok(ptr);
        }

        let block = self.try_allocate(new_size)?;
        unsafe { ptr::copy_nonoverlapping(ptr.as_ptr(), block.as_ptr(), old_size) };
        Ok(block)
    }

    #[inline]
    unsafe fn deallocate(_ptr: NonNull<u8>, _size: usize) {}

    fn destroy(&mut self) {
        debug!(stats = %self.totals.get(), "destroying hoisted pool");
        if self.config.release == ReleasePolicy::Free {
            let mut next = self.head.get();
            while let Some(chunk) = next {
                unsafe {
                    let info = chunk.as_ptr().read();
                    next = info.next;
                    R::free(chunk.cast(), info.capacity);
                }
            }
        }
        self.head.set(None);
        self.cursor.set(ptr::null_mut());
        self.remain.set(0);
        self.totals.set(PoolStats::default());
    }

    fn stats(&self) -> PoolStats {
        self.totals.get()
    }
}

impl<R: RawAllocator> Drop for HoistedPool<R> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<R: RawAllocator> fmt::Debug for HoistedPool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoistedPool")
            .field("config", &self.config)
            .field("remain", &self.remain.get())
            .field("stats", &self.totals.get())
            .finish()
    }
}
