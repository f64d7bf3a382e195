//! `jsonfx-alloc` provides the memory pools that back every `jsonfx` value.
//!
//! # Pools
//!
//! - [`PassthroughPool`]: forwards every request to a [`RawAllocator`] and
//!   frees blocks one by one.
//! - [`ChunkedPool`], [`HoistedPool`], [`FastPool`]: bump allocators over a
//!   linked list of chunks. Blocks are never freed individually; the whole
//!   pool is released at once. They differ only in where the cursor lives.
//!
//! All pools hand out [`ALIGNMENT`]-aligned blocks and implement
//! [`PoolAllocator`], whose `NEEDS_FREE` constant tells values whether
//! tearing down a tree has to walk it.
//!
//! ```
//! use jsonfx_alloc::{ChunkedPool, PoolAllocator};
//!
//! let pool = ChunkedPool::<jsonfx_alloc::SystemAllocator>::new();
//! let a = pool.allocate(24);
//! let b = pool.allocate(8);
//! assert_eq!(b.as_ptr() as usize - a.as_ptr() as usize, 24);
//! assert_eq!(pool.chunk_count(), 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]

extern crate alloc;

mod tracing_macros;

mod raw;
pub use raw::{ALIGNMENT, RawAllocator, SystemAllocator, align_up, round_to_power_of_2};

mod error;
pub use error::{AllocError, AllocErrorKind, ConfigError};

mod config;
pub use config::{BigAllocPolicy, DEFAULT_CHUNK_CAPACITY, PoolConfig, ReleasePolicy};

mod stats;
pub use stats::PoolStats;

mod pool;
pub use pool::{PassthroughPool, PoolAllocator, handle_alloc_failure};

mod chunked;
pub use chunked::ChunkedPool;

mod hoisted;
pub use hoisted::HoistedPool;

mod fast;
pub use fast::FastPool;

/// The pool used when none is named.
pub type DefaultPool = ChunkedPool<SystemAllocator>;
