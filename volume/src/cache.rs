//! Single-block read cache
//!
//! Each volume caches exactly one block of `transfer_sectors * sector_size`
//! bytes. The buffer is allocated on first use and reused afterwards.

use alloc::vec::Vec;

/// One cached block
pub struct BlockCache {
    buffer: Vec<u8>,
    block: u64,
    ready: bool,
}

impl BlockCache {
    /// Empty cache; no memory is allocated until the first fill
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            block: 0,
            ready: false,
        }
    }

    /// Is `block` currently cached?
    pub fn holds(&self, block: u64) -> bool {
        self.ready && self.block == block
    }

    /// Index of the cached block, if any
    pub fn cached_block(&self) -> Option<u64> {
        self.ready.then_some(self.block)
    }

    /// Buffer of exactly `len` bytes to fill; marks the cache not ready
    pub(crate) fn prepare(&mut self, len: usize) -> &mut [u8] {
        self.ready = false;
        if self.buffer.len() != len {
            self.buffer.resize(len, 0);
        }
        &mut self.buffer
    }

    /// Record that the buffer now holds `block`
    pub(crate) fn commit(&mut self, block: u64) {
        self.block = block;
        self.ready = true;
    }

    /// Cached bytes
    pub(crate) fn data(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for BlockCache {
    fn default() -> Self {
        Self::new()
    }
}
