//! Pool configuration.

use crate::error::ConfigError;
use crate::raw::ALIGNMENT;

/// Default size of a pool chunk, header included: 64 KiB.
pub const DEFAULT_CHUNK_CAPACITY: usize = 64 * 1024;

/// What a chunked pool does with a request that does not fit in a default chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BigAllocPolicy {
    /// Oversized requests are refused.
    #[default]
    Disabled,
    /// Oversized requests get a dedicated chunk. The chunk is sized to the next
    /// power of two and becomes the current chunk when its slack beats the
    /// current chunk's remaining space; otherwise an exact-size chunk is
    /// spliced in right after the current one.
    Enabled,
}

/// What a chunked pool does with its chunks on `destroy`/drop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Every chunk is returned to the raw allocator.
    #[default]
    Free,
    /// Chunks are forgotten. Only for pools that live until process exit.
    Leak,
}

/// Construction-time settings shared by all chunked pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Size of a regular chunk in bytes, header included.
    pub chunk_capacity: usize,
    /// Handling of requests larger than a regular chunk.
    pub big_alloc: BigAllocPolicy,
    /// Handling of chunks on teardown.
    pub release: ReleasePolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            big_alloc: BigAllocPolicy::Disabled,
            release: ReleasePolicy::Free,
        }
    }
}

impl PoolConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the regular chunk capacity.
    pub fn with_chunk_capacity(mut self, chunk_capacity: usize) -> Self {
        self.chunk_capacity = chunk_capacity;
        self
    }

    /// Sets the big-allocation policy.
    pub fn with_big_alloc(mut self, big_alloc: BigAllocPolicy) -> Self {
        self.big_alloc = big_alloc;
        self
    }

    /// Sets the release policy.
    pub fn with_release(mut self, release: ReleasePolicy) -> Self {
        self.release = release;
        self
    }

    /// Checks that a pool whose chunk header takes `header_size` bytes can run
    /// with this configuration.
    pub fn validate(&self, header_size: usize) -> Result<(), ConfigError> {
        if !self.chunk_capacity.is_multiple_of(ALIGNMENT) {
            return Err(ConfigError::Misaligned {
                capacity: self.chunk_capacity,
            });
        }
        let minimum = header_size + ALIGNMENT;
        if self.chunk_capacity < minimum {
            return Err(ConfigError::ChunkTooSmall {
                capacity: self.chunk_capacity,
                minimum,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.chunk_capacity, DEFAULT_CHUNK_CAPACITY);
        assert_eq!(config.big_alloc, BigAllocPolicy::Disabled);
        assert_eq!(config.release, ReleasePolicy::Free);
        assert_eq!(config.validate(32), Ok(()));
    }

    #[test]
    fn builder_methods() {
        let config = PoolConfig::new()
            .with_chunk_capacity(4096)
            .with_big_alloc(BigAllocPolicy::Enabled)
            .with_release(ReleasePolicy::Leak);
        assert_eq!(config.chunk_capacity, 4096);
        assert_eq!(config.big_alloc, BigAllocPolicy::Enabled);
        assert_eq!(config.release, ReleasePolicy::Leak);
    }

    #[test]
    fn rejects_bad_capacities() {
        assert_eq!(
            PoolConfig::new().with_chunk_capacity(1001).validate(16),
            Err(ConfigError::Misaligned { capacity: 1001 })
        );
        assert_eq!(
            PoolConfig::new().with_chunk_capacity(32).validate(32),
            Err(ConfigError::ChunkTooSmall {
                capacity: 32,
                minimum: 40
            })
        );
        assert_eq!(PoolConfig::new().with_chunk_capacity(40).validate(32), Ok(()));
    }
}
