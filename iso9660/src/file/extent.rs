//! File extent management
//!
//! Extents represent contiguous data regions on disk.

use crate::utils::sector::sector_to_byte;

/// File extent (contiguous data region)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Starting LBA
    pub lba: u32,

    /// Length in bytes
    pub length: u32,
}

impl Extent {
    /// Create new extent
    pub fn new(lba: u32, length: u32) -> Self {
        Self { lba, length }
    }

    /// Byte offset of the extent on the volume
    pub fn byte_offset(&self) -> u64 {
        sector_to_byte(self.lba)
    }
}
