//! Bump pool with a full header at the start of every chunk.
//!
//! ```text
//! head ──► ┌────────────────────────────┬──────────────────────┬─────────┐
//!          │ cursor │ remain │ cap │ next │ allocated blocks ... │  free   │
//!          └────────────────────────│───┴──────────────────────┴─────────┘
//!                                   ▼
//!          ┌────────────────────────────┬────────────────────────────────┐
//!          │ cursor │ remain │ cap │ next │ older chunk ...               │
//!          └────────────────────────────┴────────────────────────────────┘
//! ```
//!
//! The hot path reads and updates the header of the head chunk.

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
struct ChunkHeader {
    /// Next free byte in this chunk
    cursor: *mut u8,
    /// Bytes left after `cursor`
    remain: usize,
    /// Total chunk size, header included
    capacity: usize,
    next: Option<NonNull<ChunkHeader>>,
}

/// A bump pool whose chunks each carry their own cursor.
///
/// Individual blocks are never freed; [`PoolAllocator::destroy`] (or drop)
/// releases every chunk at once. The first chunk is created by the first
/// allocation.
pub struct ChunkedPool<R: RawAllocator = SystemAllocator> {
    head: Cell<Option<NonNull<ChunkHeader>>>,
    big_chunks: Cell<usize>,
    config: PoolConfig,
    _raw: PhantomData<R>,
}

impl<R: RawAllocator> ChunkedPool<R> {
    /// Bytes taken by the header at the start of every chunk.
    pub const HEADER_SIZE: usize = size_of::<ChunkHeader>();

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
            big_chunks: Cell::new(0),
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
        self.chunks().count()
    }

    /// Bytes left in the current chunk; zero before the first allocation.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.head
            .get()
            .map_or(0, |chunk| unsafe { chunk.as_ref().remain })
    }

    fn chunks(&self) -> impl Iterator<Item = NonNull<ChunkHeader>> + '_ {
        core::iter::successors(self.head.get(), |chunk| unsafe { chunk.as_ref().next })
    }

    /// Largest request a regular chunk can hold.
    fn usable(&self) -> usize {
        self.config.chunk_capacity - Self::HEADER_SIZE
    }

    fn new_chunk(capacity: usize, size: usize) -> Result<NonNull<ChunkHeader>, AllocError> {
        let base = R::malloc(capacity).ok_or(AllocError::exhausted(size))?;
        let chunk = base.cast::<ChunkHeader>();
        unsafe {
            chunk.as_ptr().write(ChunkHeader {
                cursor: base.as_ptr().add(Self::HEADER_SIZE),
                remain: capacity - Self::HEADER_SIZE,
                capacity,
                next: None,
            });
        }
        Ok(chunk)
    }

    /// Takes `aligned` bytes off the front of `chunk`'s free space.
    ///
    /// # Safety
    ///
    /// `chunk` must be a live chunk of this pool.
    unsafe fn bump(chunk: NonNull<ChunkHeader>, aligned: usize) -> Option<NonNull<u8>> {
        let header = unsafe { &mut *chunk.as_ptr() };
        if aligned > header.remain {
            return None;
        }
        let block = header.cursor;
        header.cursor = unsafe { block.add(aligned) };
        header.remain -= aligned;
        NonNull::new(block)
    }

    /// Makes `chunk` the current chunk, linked before the previous one.
    fn push_front(&self, chunk: NonNull<ChunkHeader>) {
        unsafe { (*chunk.as_ptr()).next = self.head.get() };
        self.head.set(Some(chunk));
    }

    fn allocate_big(&self, size: usize, aligned: usize) -> Result<NonNull<u8>, AllocError> {
        let exact = aligned
            .checked_add(Self::HEADER_SIZE)
            .ok_or(AllocError::overflow(size))?;
        let rounded = round_to_power_of_2(exact).ok_or(AllocError::overflow(size))?;

        let chunk = match self.head.get() {
            // The rounded chunk would waste less than the current chunk still
            // has, so keep the current chunk and park an exact-size one behind it.
            Some(current) if rounded - exact <= unsafe { current.as_ref().remain } => {
                let chunk = Self::new_chunk(exact, size)?;
                unsafe {
                    (*chunk.as_ptr()).next = current.as_ref().next;
                    (*current.as_ptr()).next = Some(chunk);
                }
                debug!(size, capacity = exact, "spliced big chunk behind the current chunk");
                chunk
            }
            _ => {
                let chunk = Self::new_chunk(rounded, size)?;
                self.push_front(chunk);
                debug!(size, capacity = rounded, "big chunk became the current chunk");
                chunk
            }
        };
        self.big_chunks.set(self.big_chunks.get() + 1);
        unsafe { Self::bump(chunk, aligned) }.ok_or(AllocError::exhausted(size))
    }
}

impl<R: RawAllocator> Default for ChunkedPool<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RawAllocator> PoolAllocator for ChunkedPool<R> {
    const NEEDS_FREE: bool = false;

    fn try_allocate(&self, size: usize) -> Result<NonNull<u8>, AllocError> {
        let aligned = align_up(size).ok_or(AllocError::overflow(size))?;
        if let Some(current) = self.head.get()
            && let Some(block) = unsafe { Self::bump(current, aligned) }
        {
            return Ok(block);
        }

        if aligned > self.usable() {
            return match self.config.big_alloc {
                BigAllocPolicy::Disabled => Err(AllocError::oversized(size, self.usable())),
                BigAllocPolicy::Enabled => self.allocate_big(size, aligned),
            };
        }

        let chunk = Self::new_chunk(self.config.chunk_capacity, size)?;
        self.push_front(chunk);
        trace!(capacity = self.config.chunk_capacity, "added chunk");
        unsafe { Self::bump(chunk, aligned) }.ok_or(AllocError::exhausted(size))
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

        if let Some(current) = self.head.get() {
            let header = unsafe { &mut *current.as_ptr() };
            let increment = new_aligned - old_aligned;
            if ptr.as_ptr().wrapping_add(old_aligned) == header.cursor && increment <= header.remain {
                header.cursor = unsafe { header.cursor.add(increment) };
                header.remain -= increment;
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
        debug!(stats = %self.stats(), "destroying chunked pool");
        if self.config.release == ReleasePolicy::Free {
            let mut next = self.head.get();
            while let Some(chunk) = next {
                unsafe {
                    let header = chunk.as_ptr().read();
                    next = header.next;
                    R::free(chunk.cast(), header.capacity);
                }
            }
        }
        self.head.set(None);
        self.big_chunks.set(0);
    }

    fn stats(&self) -> PoolStats {
        let mut stats = PoolStats {
            big_chunk_count: self.big_chunks.get(),
            ..PoolStats::default()
        };
        for chunk in self.chunks() {
            let header = unsafe { chunk.as_ref() };
            stats.chunk_count += 1;
            stats.bytes_reserved += header.capacity;
            stats.bytes_used += header.capacity - Self::HEADER_SIZE - header.remain;
        }
        stats
    }
}

impl<R: RawAllocator> Drop for ChunkedPool<R> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<R: RawAllocator> fmt::Debug for ChunkedPool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedPool")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
