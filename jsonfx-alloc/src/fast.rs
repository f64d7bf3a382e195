//! Bump pool addressing blocks as an offset from the chunk base.
//!
//! Each chunk header records how many bytes of the chunk are in use, header
//! included, so the next block always sits at `chunk + used`.

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
    /// Bytes in use, header included
    used: usize,
    capacity: usize,
    /// Pads the header to four words.
    _reserved: usize,
}

impl ChunkInfo {
    fn free(&self) -> usize {
        self.capacity - self.used
    }
}

/// A bump pool whose cursor is the chunk base plus a used-byte count.
pub struct FastPool<R: RawAllocator = SystemAllocator> {
    head: Cell<Option<NonNull<ChunkInfo>>>,
    totals: Cell<PoolStats>,
    config: PoolConfig,
    _raw: PhantomData<R>,
}

impl<R: RawAllocator> FastPool<R> {
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
        self.head
            .get()
            .map_or(0, |chunk| unsafe { chunk.as_ref().free() })
    }

    fn record(&self, update: impl FnOnce(&mut PoolStats)) {
        let mut totals = self.totals.get();
        update(&mut totals);
        self.totals.set(totals);
    }

    /// Creates a chunk whose first `aligned` bytes are already handed out.
    fn new_chunk(
        &self,
        capacity: usize,
        size: usize,
        aligned: usize,
    ) -> Result<(NonNull<ChunkInfo>, NonNull<u8>), AllocError> {
        let base = R::malloc(capacity).ok_or(AllocError::exhausted(size))?;
        let chunk = base.cast::<ChunkInfo>();
        unsafe {
            chunk.as_ptr().write(ChunkInfo {
                next: None,
                used: Self::HEADER_SIZE + aligned,
                capacity,
                _reserved: 0,
            });
        }
        self.record(|t| {
            t.chunk_count += 1;
            t.bytes_reserved += capacity;
            t.bytes_used += aligned;
        });
        Ok((chunk, unsafe { base.add(Self::HEADER_SIZE) }))
    }

    fn allocate_big(&self, size: usize, aligned: usize) -> Result<NonNull<u8>, AllocError> {
        let exact = aligned
            .checked_add(Self::HEADER_SIZE)
            .ok_or(AllocError::overflow(size))?;
        let rounded = round_to_power_of_2(exact).ok_or(AllocError::overflow(size))?;

        let block = match self.head.get() {
            Some(current) if rounded - exact <= unsafe { current.as_ref().free() } => {
                let (chunk, block) = self.new_chunk(exact, size, aligned)?;
                unsafe {
                    (*chunk.as_ptr()).next = current.as_ref().next;
                    (*current.as_ptr()).next = Some(chunk);
                }
                debug!(size, capacity = exact, "spliced big chunk behind the current chunk");
                block
            }
            current => {
                let (chunk, block) = self.new_chunk(rounded, size, aligned)?;
                unsafe { (*chunk.as_ptr()).next = current };
                self.head.set(Some(chunk));
                debug!(size, capacity = rounded, "big chunk became the current chunk");
                block
            }
        };
        self.record(|t| t.big_chunk_count += 1);
        Ok(block)
    }
}

impl<R: RawAllocator> Default for FastPool<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RawAllocator> PoolAllocator for FastPool<R> {
    const NEEDS_FREE: bool = false;

    fn try_allocate(&self, size: usize) -> Result<NonNull<u8>, AllocError> {
        let aligned = align_up(size).ok_or(AllocError::overflow(size))?;
        if let Some(current) = self.head.get() {
            let info = unsafe { &mut *current.as_ptr() };
            if aligned <= info.free() {
                let block = unsafe { current.cast::<u8>().add(info.used) };
                info.used += aligned;
                self.record(|t| t.bytes_used += aligned);
                return Ok(block);
            }
        }

        let usable = self.config.chunk_capacity - Self::HEADER_SIZE;
        if aligned > usable {
            return match self.config.big_alloc {
                BigAllocPolicy::Disabled => Err(AllocError::oversized(size, usable)),
                BigAllocPolicy::Enabled => self.allocate_big(size, aligned),
            };
        }

        let (chunk, block) = self.new_chunk(self.config.chunk_capacity, size, aligned)?;
        unsafe { (*chunk.as_ptr()).next = self.head.get() };
        self.head.set(Some(chunk));
        trace!(capacity = self.config.chunk_capacity, "added chunk");
        Ok(block)
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

        if let Some(current) = self.head.get() {
            let info = unsafe { &mut *current.as_ptr() };
            let end = current.as_ptr().cast::<u8>().wrapping_add(info.used);
            if ptr.as_ptr().wrapping_add(old_aligned) == end && increment <= info.free() {
                info.used += increment;
                self.record(|t| t.bytes_used += increment);
                trace!(old_size, new_size, "grew block in place");
                return Ok(ptr);
            }
        }

        let block = self.try_allocate(new_size)?;
        unsafe { ptr::copy_nonoverlapping(ptr.as_ptr(), block.as_ptr(), old_size) };
        Ok(block)
    }

    #[inline]
    unsafe fn deallocate(_ptr: NonNull<u8>, _size: usize) {}

    fn destroy(&mut self) {
        debug!(stats = %self.totals.get(), "destroying fast pool");
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
        self.totals.set(PoolStats::default());
    }

    fn stats(&self) -> PoolStats {
        self.totals.get()
    }
}

impl<R: RawAllocator> Drop for FastPool<R> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<R: RawAllocator> fmt::Debug for FastPool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastPool")
            .field("config", &self.config)
            .field("stats", &self.totals.get())
            .finish()
    }
}
