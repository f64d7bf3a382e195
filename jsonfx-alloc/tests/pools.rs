//! Behavior shared by all chunked pools, checked against every variant.

use std::cell::Cell;
use std::ptr::NonNull;

use jsonfx_alloc::{
    BigAllocPolicy, ChunkedPool, FastPool, HoistedPool, PassthroughPool, PoolAllocator,
    PoolConfig, RawAllocator, ReleasePolicy, SystemAllocator, align_up,
};
use proptest::collection::vec;
use proptest::prelude::*;

thread_local! {
    static LIVE_CHUNKS: Cell<usize> = const { Cell::new(0) };
}

/// The system heap, counting live blocks for the current thread.
struct Counting;

unsafe impl RawAllocator for Counting {
    fn malloc(size: usize) -> Option<NonNull<u8>> {
        LIVE_CHUNKS.with(|live| live.set(live.get() + 1));
        SystemAllocator::malloc(size)
    }

    unsafe fn realloc(ptr: NonNull<u8>, old_size: usize, new_size: usize) -> Option<NonNull<u8>> {
        unsafe { SystemAllocator::realloc(ptr, old_size, new_size) }
    }

    unsafe fn free(ptr: NonNull<u8>, size: usize) {
        LIVE_CHUNKS.with(|live| live.set(live.get() - 1));
        unsafe { SystemAllocator::free(ptr, size) }
    }
}

fn live_chunks() -> usize {
    LIVE_CHUNKS.with(Cell::get)
}

trait TestPool: PoolAllocator + Sized {
    const HEADER: usize;
    fn build(config: PoolConfig) -> Self;
    fn chunks(&self) -> usize;
    fn remaining(&self) -> usize;
}

macro_rules! test_pool {
    ($pool:ident) => {
        impl TestPool for $pool<Counting> {
            const HEADER: usize = $pool::<Counting>::HEADER_SIZE;

            fn build(config: PoolConfig) -> Self {
                $pool::with_config(config)
            }

            fn chunks(&self) -> usize {
                self.chunk_count()
            }

            fn remaining(&self) -> usize {
                $pool::remaining(self)
            }
        }
    };
}

test_pool!(ChunkedPool);
test_pool!(HoistedPool);
test_pool!(FastPool);

fn config(capacity: usize) -> PoolConfig {
    PoolConfig::new()
        .with_chunk_capacity(capacity)
        .with_big_alloc(BigAllocPolicy::Enabled)
}

fn blocks_are_aligned_and_disjoint<P: TestPool>(sizes: &[usize]) -> Result<(), TestCaseError> {
    let pool = P::build(config(512));
    let blocks: Vec<_> = sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let block = pool.allocate(size);
            unsafe { block.as_ptr().write_bytes(i as u8, size) };
            (block, size)
        })
        .collect();

    for (i, &(block, size)) in blocks.iter().enumerate() {
        prop_assert_eq!(block.as_ptr() as usize % jsonfx_alloc::ALIGNMENT, 0);
        let bytes = unsafe { std::slice::from_raw_parts(block.as_ptr(), size) };
        prop_assert!(bytes.iter().all(|&b| b == i as u8), "block {} was overwritten", i);
    }
    Ok(())
}

fn consecutive_blocks_bump<P: TestPool>(sizes: &[usize]) -> Result<(), TestCaseError> {
    let pool = P::build(config(4096));
    let mut previous: Option<(NonNull<u8>, usize, usize)> = None;
    for &size in sizes {
        let block = pool.allocate(size);
        let chunks = pool.chunks();
        if let Some((prev, prev_size, prev_chunks)) = previous
            && prev_chunks == chunks
        {
            let step = block.as_ptr() as usize - prev.as_ptr() as usize;
            prop_assert_eq!(Some(step), align_up(prev_size));
        }
        previous = Some((block, size, chunks));
    }
    Ok(())
}

fn accounting_matches_requests<P: TestPool>(sizes: &[usize]) -> Result<(), TestCaseError> {
    let pool = P::build(config(1024));
    for &size in sizes {
        pool.allocate(size);
    }
    let expected: usize = sizes.iter().map(|&s| align_up(s).unwrap_or(0)).sum();
    let stats = pool.stats();
    prop_assert_eq!(stats.bytes_used, expected);
    prop_assert_eq!(stats.chunk_count, pool.chunks());
    prop_assert!(stats.bytes_used <= stats.bytes_reserved);
    Ok(())
}

/// Within every regular chunk, bytes handed out plus bytes left equal the
/// capacity minus the header. Tails left behind when a chunk fills up are
/// counted as they are abandoned.
fn regular_chunks_account_for_every_byte<P: TestPool>(sizes: &[usize]) -> Result<(), TestCaseError> {
    let pool = P::build(config(1024));
    let mut abandoned = 0;
    for &size in sizes {
        let (chunks, remaining) = (pool.chunks(), pool.remaining());
        pool.allocate(size);
        if pool.chunks() > chunks {
            abandoned += remaining;
        }
        let stats = pool.stats();
        prop_assert_eq!(stats.big_chunk_count, 0);
        prop_assert_eq!(
            stats.bytes_used + pool.remaining() + abandoned,
            stats.bytes_reserved - stats.chunk_count * P::HEADER
        );
    }
    Ok(())
}

fn last_block_grows_in_place<P: TestPool>(old: usize, extra: usize) -> Result<(), TestCaseError> {
    let pool = P::build(config(4096));
    pool.allocate(8);
    let block = pool.allocate(old);
    unsafe {
        block.as_ptr().write_bytes(0xC3, old);
        let grown = pool.reallocate(block, old, old + extra);
        prop_assert_eq!(grown, block);
        prop_assert_eq!(pool.chunks(), 1);
        let bytes = std::slice::from_raw_parts(grown.as_ptr(), old);
        prop_assert!(bytes.iter().all(|&b| b == 0xC3));
    }
    Ok(())
}

fn earlier_block_is_copied<P: TestPool>(old: usize, extra: usize) -> Result<(), TestCaseError> {
    let pool = P::build(config(4096));
    let block = pool.allocate(old);
    unsafe { block.as_ptr().write_bytes(0x7E, old) };
    pool.allocate(8);
    let moved = unsafe { pool.reallocate(block, old, old + extra) };
    prop_assert_ne!(moved, block);
    let bytes = unsafe { std::slice::from_raw_parts(moved.as_ptr(), old) };
    prop_assert!(bytes.iter().all(|&b| b == 0x7E));
    Ok(())
}

proptest! {
    #[test]
    fn chunked_blocks_are_aligned_and_disjoint(sizes in vec(0usize..300, 1..200)) {
        blocks_are_aligned_and_disjoint::<ChunkedPool<Counting>>(&sizes)?;
    }

    #[test]
    fn hoisted_blocks_are_aligned_and_disjoint(sizes in vec(0usize..300, 1..200)) {
        blocks_are_aligned_and_disjoint::<HoistedPool<Counting>>(&sizes)?;
    }

    #[test]
    fn fast_blocks_are_aligned_and_disjoint(sizes in vec(0usize..300, 1..200)) {
        blocks_are_aligned_and_disjoint::<FastPool<Counting>>(&sizes)?;
    }

    #[test]
    fn chunked_consecutive_blocks_bump(sizes in vec(0usize..100, 1..300)) {
        consecutive_blocks_bump::<ChunkedPool<Counting>>(&sizes)?;
    }

    #[test]
    fn hoisted_consecutive_blocks_bump(sizes in vec(0usize..100, 1..300)) {
        consecutive_blocks_bump::<HoistedPool<Counting>>(&sizes)?;
    }

    #[test]
    fn fast_consecutive_blocks_bump(sizes in vec(0usize..100, 1..300)) {
        consecutive_blocks_bump::<FastPool<Counting>>(&sizes)?;
    }

    #[test]
    fn chunked_accounting(sizes in vec(0usize..2000, 0..100)) {
        accounting_matches_requests::<ChunkedPool<Counting>>(&sizes)?;
    }

    #[test]
    fn hoisted_accounting(sizes in vec(0usize..2000, 0..100)) {
        accounting_matches_requests::<HoistedPool<Counting>>(&sizes)?;
    }

    #[test]
    fn fast_accounting(sizes in vec(0usize..2000, 0..100)) {
        accounting_matches_requests::<FastPool<Counting>>(&sizes)?;
    }

    #[test]
    fn chunked_regular_chunk_invariant(sizes in vec(0usize..993, 0..100)) {
        regular_chunks_account_for_every_byte::<ChunkedPool<Counting>>(&sizes)?;
    }

    #[test]
    fn hoisted_regular_chunk_invariant(sizes in vec(0usize..993, 0..100)) {
        regular_chunks_account_for_every_byte::<HoistedPool<Counting>>(&sizes)?;
    }

    #[test]
    fn fast_regular_chunk_invariant(sizes in vec(0usize..993, 0..100)) {
        regular_chunks_account_for_every_byte::<FastPool<Counting>>(&sizes)?;
    }

    #[test]
    fn chunked_grows_in_place(old in 1usize..512, extra in 1usize..512) {
        last_block_grows_in_place::<ChunkedPool<Counting>>(old, extra)?;
        earlier_block_is_copied::<ChunkedPool<Counting>>(old, extra)?;
    }

    #[test]
    fn hoisted_grows_in_place(old in 1usize..512, extra in 1usize..512) {
        last_block_grows_in_place::<HoistedPool<Counting>>(old, extra)?;
        earlier_block_is_copied::<HoistedPool<Counting>>(old, extra)?;
    }

    #[test]
    fn fast_grows_in_place(old in 1usize..512, extra in 1usize..512) {
        last_block_grows_in_place::<FastPool<Counting>>(old, extra)?;
        earlier_block_is_copied::<FastPool<Counting>>(old, extra)?;
    }
}

fn chunk_count_scenario<P: TestPool>() {
    const CAPACITY: usize = 1024;
    const N: usize = 1000;
    let pool = P::build(PoolConfig::new().with_chunk_capacity(CAPACITY));
    for _ in 0..N {
        pool.allocate(16);
    }
    let per_chunk = (CAPACITY - P::HEADER) / 16;
    assert_eq!(pool.chunks(), N.div_ceil(per_chunk));
    assert_eq!(pool.chunks(), (N * 16).div_ceil(CAPACITY - P::HEADER));
}

#[test]
fn chunk_count_matches_capacity() {
    jsonfx_testhelpers::setup();
    chunk_count_scenario::<ChunkedPool<Counting>>();
    chunk_count_scenario::<HoistedPool<Counting>>();
    chunk_count_scenario::<FastPool<Counting>>();
}

/// A big chunk whose power-of-two slack the current chunk can't absorb
/// becomes current, and its tail serves the next small request.
fn big_chunk_becomes_current<P: TestPool>() {
    let pool = P::build(config(256));
    pool.allocate(256 - P::HEADER);
    assert_eq!(pool.remaining(), 0);
    // Rounds up to 1024 with 8 bytes of slack, more than the 0 left.
    let request = 1024 - P::HEADER - 8;
    let big = pool.allocate(request);
    let stats = pool.stats();
    assert_eq!(stats.chunk_count, 2);
    assert_eq!(stats.big_chunk_count, 1);
    assert_eq!(stats.bytes_reserved, 256 + 1024);
    assert_eq!(pool.remaining(), 8);
    let next = pool.allocate(8);
    assert_eq!(next.as_ptr() as usize - big.as_ptr() as usize, request);
}

/// A big chunk with little slack is parked behind the current chunk, which
/// keeps serving small requests.
fn big_chunk_is_spliced<P: TestPool>() {
    let pool = P::build(config(256));
    let first = pool.allocate(8);
    let left = pool.remaining();
    // Rounds up to 1024 with 16 bytes of slack, less than what is left.
    let request = 1024 - P::HEADER - 16;
    pool.allocate(request);
    let stats = pool.stats();
    assert_eq!(stats.chunk_count, 2);
    assert_eq!(stats.big_chunk_count, 1);
    assert_eq!(stats.bytes_reserved, 256 + request + P::HEADER);
    assert_eq!(pool.remaining(), left);
    let after = pool.allocate(8);
    assert_eq!(after.as_ptr() as usize - first.as_ptr() as usize, 8);
}

#[test]
fn big_chunks_splice_or_become_current() {
    jsonfx_testhelpers::setup();
    big_chunk_becomes_current::<ChunkedPool<Counting>>();
    big_chunk_becomes_current::<HoistedPool<Counting>>();
    big_chunk_becomes_current::<FastPool<Counting>>();
    big_chunk_is_spliced::<ChunkedPool<Counting>>();
    big_chunk_is_spliced::<HoistedPool<Counting>>();
    big_chunk_is_spliced::<FastPool<Counting>>();
}

fn destroy_frees_every_chunk<P: TestPool>() {
    let before = live_chunks();
    let mut pool = P::build(config(256));
    for size in [8, 300, 16, 5000, 200, 64] {
        pool.allocate(size);
    }
    assert_eq!(live_chunks() - before, pool.chunks());
    pool.destroy();
    assert_eq!(live_chunks(), before);

    pool.allocate(8);
    assert_eq!(live_chunks(), before + 1);
    drop(pool);
    assert_eq!(live_chunks(), before);
}

#[test]
fn destroy_and_drop_free_every_chunk() {
    jsonfx_testhelpers::setup();
    destroy_frees_every_chunk::<ChunkedPool<Counting>>();
    destroy_frees_every_chunk::<HoistedPool<Counting>>();
    destroy_frees_every_chunk::<FastPool<Counting>>();
}

#[test]
fn leak_policy_skips_release() {
    let before = live_chunks();
    let pool = ChunkedPool::<Counting>::with_config(
        PoolConfig::new()
            .with_chunk_capacity(64)
            .with_release(ReleasePolicy::Leak),
    );
    pool.allocate(8);
    drop(pool);
    assert_eq!(live_chunks(), before + 1);
}

#[test]
fn passthrough_frees_each_block() {
    let before = live_chunks();
    let pool = PassthroughPool::<Counting>::new();
    let a = pool.allocate(100);
    let b = pool.allocate(3);
    assert_eq!(live_chunks(), before + 2);
    unsafe {
        PassthroughPool::<Counting>::deallocate(a, 100);
        PassthroughPool::<Counting>::deallocate(b, 3);
    }
    assert_eq!(live_chunks(), before);
}

#[test]
#[should_panic(expected = "invalid pool configuration")]
fn tiny_chunks_are_rejected() {
    let _ = ChunkedPool::<SystemAllocator>::with_config(PoolConfig::new().with_chunk_capacity(16));
}

#[test]
fn arena_pools_do_not_need_free() {
    const {
        assert!(!<ChunkedPool as PoolAllocator>::NEEDS_FREE);
        assert!(!<HoistedPool as PoolAllocator>::NEEDS_FREE);
        assert!(!<FastPool as PoolAllocator>::NEEDS_FREE);
    }
}

mod confinement {
    use super::*;
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    assert_not_impl_any!(ChunkedPool: Sync, Send);
    assert_not_impl_any!(HoistedPool: Sync, Send);
    assert_not_impl_any!(FastPool: Sync, Send);
    assert_impl_all!(PassthroughPool: Default, Send, Sync);
}
