//! Pool occupancy counters.

use core::fmt;

/// A snapshot of how much memory a pool holds.
///
/// Byte counts include chunk headers in `bytes_reserved` but not in
/// `bytes_used`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of chunks currently owned by the pool.
    pub chunk_count: usize,
    /// Bytes handed out to callers, after alignment.
    pub bytes_used: usize,
    /// Bytes obtained from the raw allocator.
    pub bytes_reserved: usize,
    /// Chunks created through the big-allocation path.
    pub big_chunk_count: usize,
}

impl PoolStats {
    /// Fraction of reserved memory that was handed out, in `0.0..=1.0`.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.bytes_reserved == 0 {
            0.0
        } else {
            self.bytes_used as f64 / self.bytes_reserved as f64
        }
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chunks ({} big), {}/{} bytes",
            self.chunk_count, self.big_chunk_count, self.bytes_used, self.bytes_reserved
        )
    }
}
