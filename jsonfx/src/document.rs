//! A root value bound to the pool it is built in.

use core::cell::Cell;
use core::ops::{Deref, DerefMut};
use std::io::Read;

use jsonfx_alloc::{DefaultPool, PoolAllocator};
use jsonfx_value::{Value, Visitor};
use serde::de::DeserializeSeed;

use crate::build::TreeBuilder;
use crate::tracing_macros::debug;
use crate::error::DocumentError;
use crate::file_stream::FileStream;

/// A JSON document: a root [`Value`] plus the pool its nodes live in.
///
/// The document borrows the pool, so the pool outlives every node. A
/// document dereferences to its root value.
///
/// ```
/// use jsonfx::{ChunkedPool, Document};
///
/// let pool: ChunkedPool = ChunkedPool::new();
/// let mut doc = Document::new(&pool);
/// doc.parse(r#"{"hello": "world", "n": [1, 2, 3]}"#).unwrap();
/// assert_eq!(doc["hello"].get_string(), "world");
/// assert_eq!(doc["n"].size(), 3);
/// ```
pub struct Document<'p, A: PoolAllocator = DefaultPool> {
    root: Value<'p, A>,
    pool: &'p A,
}

impl<'p, A: PoolAllocator> Document<'p, A> {
    /// Creates a document with a null root.
    pub fn new(pool: &'p A) -> Self {
        Self {
            root: Value::null(),
            pool,
        }
    }

    /// Runs `f` on a document backed by a freshly created pool, then drops
    /// both.
    pub fn with_default_pool<R>(f: impl FnOnce(&mut Document<'_, A>) -> R) -> R
    where
        A: Default,
    {
        let pool = A::default();
        let mut doc = Document::new(&pool);
        let result = f(&mut doc);
        drop(doc);
        debug!(stats = %pool.stats(), "dropping document pool");
        result
    }

    /// The pool nodes are allocated from.
    #[must_use]
    pub fn allocator(&self) -> &'p A {
        self.pool
    }

    /// The root value.
    #[must_use]
    pub fn root(&self) -> &Value<'p, A> {
        &self.root
    }

    /// The root value, mutably.
    pub fn root_mut(&mut self) -> &mut Value<'p, A> {
        &mut self.root
    }

    /// Takes the root out, leaving null behind.
    pub fn take_root(&mut self) -> Value<'p, A> {
        core::mem::take(&mut self.root)
    }

    /// Replaces the root with the tree parsed from `text`.
    ///
    /// Every string is copied into the pool, so `text` may be dropped right
    /// after. On error the previous root is kept.
    ///
    /// A pool that cannot hold a node fails the parse with
    /// [`DocumentError::Alloc`]. With the default [`PoolConfig`], that is any
    /// single string or container larger than a chunk; enable
    /// [`BigAllocPolicy::Enabled`] to lift the limit.
    ///
    /// [`PoolConfig`]: jsonfx_alloc::PoolConfig
    /// [`BigAllocPolicy::Enabled`]: jsonfx_alloc::BigAllocPolicy::Enabled
    pub fn parse(&mut self, text: &str) -> Result<&mut Self, DocumentError> {
        if text.trim_ascii().is_empty() {
            return Err(DocumentError::Empty);
        }
        let failure = Cell::new(None);
        let mut de = serde_json::Deserializer::from_str(text);
        let root = TreeBuilder::new(self.pool, &failure)
            .deserialize(&mut de)
            .map_err(|err| match failure.take() {
                Some(refused) => DocumentError::Alloc(refused),
                None => DocumentError::Json(err),
            })?;
        de.end()?;
        self.root = root;
        debug!(bytes = text.len(), stats = %self.pool.stats(), "parsed document");
        Ok(self)
    }

    /// Reads the rest of `stream` and parses it as in [`Document::parse`].
    pub fn parse_stream(&mut self, stream: &mut FileStream) -> Result<&mut Self, DocumentError> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        let text = core::str::from_utf8(&bytes)?;
        self.parse(text)
    }

    /// Walks the root value with `visitor`.
    pub fn visit<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        self.root.accept(visitor)
    }
}

impl<'p, A: PoolAllocator> Deref for Document<'p, A> {
    type Target = Value<'p, A>;

    fn deref(&self) -> &Self::Target {
        &self.root
    }
}

impl<A: PoolAllocator> DerefMut for Document<'_, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.root
    }
}

impl<A: PoolAllocator> core::fmt::Debug for Document<'_, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.root, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonfx_alloc::{FastPool, PassthroughPool, SystemAllocator};

    #[test]
    fn failed_parse_keeps_the_old_root() {
        let pool = FastPool::<SystemAllocator>::new();
        let mut doc = Document::new(&pool);
        doc.parse("[1, 2]").unwrap();
        let err = doc.parse("[1, 2").unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)), "{err}");
        assert_eq!(doc.size(), 2);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let pool = FastPool::<SystemAllocator>::new();
        let mut doc = Document::new(&pool);
        assert!(matches!(doc.parse("{} x"), Err(DocumentError::Json(_))));
        assert!(doc.is_null());
    }

    #[test]
    fn blank_input_is_empty() {
        let pool = FastPool::<SystemAllocator>::new();
        let mut doc = Document::new(&pool);
        assert!(matches!(doc.parse(" \n\t "), Err(DocumentError::Empty)));
    }

    #[test]
    fn default_pool_lives_for_the_closure() {
        let len = Document::<PassthroughPool<SystemAllocator>>::with_default_pool(|doc| {
            doc.parse(r#"["a string long enough to need the pool"]"#).unwrap();
            doc[0].get_string_length()
        });
        assert_eq!(len, 37);
    }

    #[test]
    fn take_root_leaves_null() {
        let pool = FastPool::<SystemAllocator>::new();
        let mut doc = Document::new(&pool);
        doc.parse("true").unwrap();
        let root = doc.take_root();
        assert!(root.is_true());
        assert!(doc.is_null());
    }
}
