//! Error types for allocation and pool configuration.

use alloc::alloc::Layout;
use core::fmt;

use crate::raw::ALIGNMENT;

/// What went wrong during an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocErrorKind {
    /// The raw allocator returned no memory.
    Exhausted,
    /// The request does not fit in a chunk and the big-allocation escape path
    /// is disabled.
    Oversized {
        /// Largest single request the pool accepts.
        limit: usize,
    },
    /// The request size overflowed while adding alignment or header padding.
    CapacityOverflow,
}

/// An allocation request that could not be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    /// The specific kind of error
    pub kind: AllocErrorKind,
    /// Requested size in bytes, before rounding
    pub size: usize,
}

impl AllocError {
    /// The raw allocator could not provide `size` bytes.
    #[must_use]
    pub const fn exhausted(size: usize) -> Self {
        Self {
            kind: AllocErrorKind::Exhausted,
            size,
        }
    }

    /// `size` bytes exceed the `limit` a pool accepts in one block.
    #[must_use]
    pub const fn oversized(size: usize, limit: usize) -> Self {
        Self {
            kind: AllocErrorKind::Oversized { limit },
            size,
        }
    }

    /// Computing the size of a `size`-byte request overflowed.
    #[must_use]
    pub const fn overflow(size: usize) -> Self {
        Self {
            kind: AllocErrorKind::CapacityOverflow,
            size,
        }
    }

    /// The layout that failed, for `handle_alloc_error`.
    pub fn layout(&self) -> Layout {
        Layout::from_size_align(self.size.max(1), ALIGNMENT).unwrap_or(Layout::new::<u64>())
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AllocErrorKind::Exhausted => {
                write!(f, "memory allocation of {} bytes failed", self.size)
            }
            AllocErrorKind::Oversized { limit } => write!(
                f,
                "allocation of {} bytes exceeds the chunk limit of {limit} bytes \
                 (big allocations are disabled)",
                self.size
            ),
            AllocErrorKind::CapacityOverflow => {
                write!(f, "allocation of {} bytes overflows", self.size)
            }
        }
    }
}

impl core::error::Error for AllocError {}

/// A [`PoolConfig`](crate::PoolConfig) that no pool can run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The chunk capacity leaves no room after the chunk header.
    ChunkTooSmall {
        /// Configured capacity
        capacity: usize,
        /// Minimum capacity for the pool variant
        minimum: usize,
    },
    /// The chunk capacity is not a multiple of [`ALIGNMENT`].
    Misaligned {
        /// Configured capacity
        capacity: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ChunkTooSmall { capacity, minimum } => write!(
                f,
                "chunk capacity {capacity} is too small (minimum is {minimum} bytes)"
            ),
            ConfigError::Misaligned { capacity } => write!(
                f,
                "chunk capacity {capacity} is not a multiple of {ALIGNMENT}"
            ),
        }
    }
}

impl core::error::Error for ConfigError {}
