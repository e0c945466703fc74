//! Sector alignment and calculation utilities

use crate::types::SECTOR_SIZE;

/// Start of the sector following the one containing `offset`
pub fn next_sector_boundary(offset: usize) -> usize {
    (offset / SECTOR_SIZE + 1) * SECTOR_SIZE
}

/// Convert sector number to byte offset
pub fn sector_to_byte(sector: u32) -> u64 {
    sector as u64 * SECTOR_SIZE as u64
}
