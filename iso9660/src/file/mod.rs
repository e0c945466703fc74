//! File handles and extent-based reading

pub mod extent;

use crate::directory::{next_entry, record::DirectoryRecord};
use crate::error::{Iso9660Error, Result};
use alloc::vec::Vec;
use extent::Extent;
use morpheus_volume::{Volume, VolumeCoord};

/// An open ISO9660 file
///
/// Holds the ordered extent list of the file. The total size is the sum of
/// the extent sizes.
#[derive(Debug, Clone)]
pub struct IsoFile {
    coord: VolumeCoord,
    extents: Vec<Extent>,
    total_size: u64,
}

impl IsoFile {
    /// Handle over a single extent (directories opened with a trailing slash)
    pub(crate) fn single(coord: VolumeCoord, lba: u32, length: u32) -> Self {
        Self {
            coord,
            extents: alloc::vec![Extent::new(lba, length)],
            total_size: length as u64,
        }
    }

    /// Build a handle from the record at `offset`, following continuation
    /// records of a multi-extent file
    ///
    /// The first pass counts extents and sums their sizes; the second
    /// records them. At most `max_extents` extents are collected.
    pub(crate) fn from_record(
        coord: VolumeCoord,
        dir: &[u8],
        offset: usize,
        max_extents: u32,
    ) -> Result<Self> {
        let max_extents = max_extents.max(1) as usize;
        let first = DirectoryRecord::parse(&dir[offset..])?;

        let mut count = 1usize;
        let mut total_size = first.data_length() as u64;
        let mut current = first;
        let mut pos = offset;
        while current.is_multi_extent() && count < max_extents {
            let Some(next) = next_entry(dir, pos) else {
                break;
            };
            pos = next;
            current = DirectoryRecord::parse(&dir[pos..])?;
            count += 1;
            total_size += current.data_length() as u64;
        }

        let mut extents = Vec::with_capacity(count);
        let mut pos = offset;
        for i in 0..count {
            let record = DirectoryRecord::parse(&dir[pos..])?;
            extents.push(Extent::new(record.extent_lba(), record.data_length()));
            if i + 1 < count {
                pos = next_entry(dir, pos).ok_or(Iso9660Error::InvalidDirectoryRecord)?;
            }
        }

        Ok(Self {
            coord,
            extents,
            total_size,
        })
    }

    /// File size in bytes
    pub fn size(&self) -> u64 {
        self.total_size
    }

    /// Extent list in file order
    pub fn extents(&self) -> &[Extent] {
        &self.extents
    }

    /// Coordinate of the volume the file was opened on
    pub fn coord(&self) -> VolumeCoord {
        self.coord
    }

    /// Read `buffer.len()` bytes starting at file offset `offset`
    ///
    /// Issues one volume read per covered extent.
    pub fn try_read(&self, volume: &mut Volume, buffer: &mut [u8], offset: u64) -> Result<()> {
        if volume.coord() != self.coord {
            return Err(Iso9660Error::WrongVolume);
        }
        let end = offset
            .checked_add(buffer.len() as u64)
            .ok_or(Iso9660Error::ReadOutOfBounds)?;
        if end > self.total_size {
            return Err(Iso9660Error::ReadOutOfBounds);
        }

        let mut loc = offset;
        let mut done = 0usize;
        let mut extent_start = 0u64;
        for extent in &self.extents {
            if done == buffer.len() {
                break;
            }
            let extent_end = extent_start + extent.length as u64;
            if loc < extent_end {
                let in_extent = loc - extent_start;
                let available = extent.length as u64 - in_extent;
                let chunk = available.min((buffer.len() - done) as u64) as usize;

                let disk_offset = extent
                    .byte_offset()
                    .checked_add(in_extent)
                    .ok_or(Iso9660Error::ExtentOutOfBounds)?;
                volume.read(&mut buffer[done..done + chunk], disk_offset)?;

                done += chunk;
                loc += chunk as u64;
            }
            extent_start = extent_end;
        }

        Ok(())
    }

    /// Read file data, halting on failure
    ///
    /// # Panics
    ///
    /// Panics if the read fails; a file that opened successfully is expected
    /// to be readable.
    pub fn read(&self, volume: &mut Volume, buffer: &mut [u8], offset: u64) {
        if let Err(err) = self.try_read(volume, buffer, offset) {
            panic!("iso9660: failed to read file data: {}", err);
        }
    }

    /// Release the handle
    pub fn close(self) {}
}
