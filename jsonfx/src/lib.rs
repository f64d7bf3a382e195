//! `jsonfx` builds JSON documents in memory pools.
//!
//! The pieces live in two smaller crates, re-exported here:
//!
//! - [`jsonfx_alloc`]: the pools. [`ChunkedPool`], [`HoistedPool`] and
//!   [`FastPool`] are bump allocators released all at once;
//!   [`PassthroughPool`] frees block by block.
//! - [`jsonfx_value`]: the [`Value`] tree, its [`Member`]s and iterators.
//!
//! This crate adds [`Document`], which parses text into a pool, and
//! [`FileStream`] to read that text from a file.
//!
//! # Feature flags
//!
//! - `tracing`: log chunk growth, big allocations, pool teardown and parses
//!   through the `tracing` crate.
//!
//! ```
//! use jsonfx::{Document, FastPool};
//!
//! let len = Document::<FastPool>::with_default_pool(|doc| {
//!     doc.parse(r#"{"items": [true, null, "x"]}"#).unwrap();
//!     doc["items"].size()
//! });
//! assert_eq!(len, 3);
//! ```

#![warn(missing_docs)]

mod tracing_macros;

mod build;

mod error;
pub use error::DocumentError;

mod document;
pub use document::Document;

mod file_stream;
pub use file_stream::FileStream;

pub use jsonfx_alloc::{
    self, AllocError, AllocErrorKind, BigAllocPolicy, ChunkedPool, ConfigError, DefaultPool,
    FastPool, HoistedPool, PassthroughPool, PoolAllocator, PoolConfig, PoolStats, RawAllocator,
    ReleasePolicy, SystemAllocator,
};
pub use jsonfx_value::{
    self, INLINE_CAPACITY, Member, MemberIter, MemberIterMut, Number, TypeFlags, Value, ValueType,
    Visitor,
};
