//! String payloads: inline storage and string comparison.

use core::fmt::{self, Debug, Formatter};
use core::str;

use jsonfx_alloc::{AllocError, PoolAllocator};

use crate::seq::RawSeq;

/// Longest string, in bytes, stored inside a value without touching the pool.
pub const INLINE_CAPACITY: usize = 14;

/// Short string bytes stored in the value itself.
#[derive(Clone, Copy)]
pub(crate) struct InlineStr {
    len: u8,
    bytes: [u8; INLINE_CAPACITY],
}

impl InlineStr {
    pub(crate) fn new(s: &str) -> Option<Self> {
        if s.len() > INLINE_CAPACITY {
            return None;
        }
        let mut bytes = [0; INLINE_CAPACITY];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Some(Self {
            len: s.len() as u8,
            bytes,
        })
    }

    pub(crate) fn as_str(&self) -> &str {
        // Built from a whole `&str`, so the prefix is valid UTF-8.
        unsafe { str::from_utf8_unchecked(&self.bytes[..usize::from(self.len)]) }
    }
}

impl Debug for InlineStr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self.as_str(), f)
    }
}

/// Copies `s` into a pool-allocated run of exactly `s.len()` bytes.
pub(crate) fn try_copy_into_pool<A: PoolAllocator>(
    s: &str,
    pool: &A,
) -> Result<RawSeq<u8>, AllocError> {
    let mut bytes = RawSeq::try_with_capacity(s.len(), pool)?;
    // Exact capacity: this cannot grow, so it cannot fail.
    bytes.try_extend_from_slice(s.as_bytes(), pool)?;
    Ok(bytes)
}

/// Reads back a run filled by [`try_copy_into_pool`].
pub(crate) fn owned_as_str(bytes: &RawSeq<u8>) -> &str {
    unsafe { str::from_utf8_unchecked(bytes.as_slice()) }
}

/// Length check, then pointer identity, then bytes.
#[inline]
pub(crate) fn str_equal(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if core::ptr::eq(a.as_ptr(), b.as_ptr()) {
        return true;
    }
    a.as_bytes() == b.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_limit() {
        assert_eq!(InlineStr::new("fourteen bytes").map(|s| s.len), Some(14));
        assert!(InlineStr::new("fifteen bytes!!").is_none());
        assert_eq!(InlineStr::new("").map(|s| s.len), Some(0));
    }

    #[test]
    fn multibyte_round_trip() {
        let s = InlineStr::new("héllo wörld").unwrap();
        assert_eq!(s.as_str(), "héllo wörld");
    }

    #[test]
    fn equality_shortcuts() {
        let text = "same";
        assert!(str_equal(text, text));
        assert!(str_equal("abc", &alloc::string::String::from("abc")));
        assert!(!str_equal("abc", "abcd"));
        assert!(!str_equal("abc", "abd"));
    }
}
