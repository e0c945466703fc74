// Open FAT files

use super::chain;
use super::context::FatContext;
use super::directory::DirEntry;
use super::error::{FatError, Result};
use crate::config::Limits;
use alloc::vec::Vec;
use morpheus_volume::{Volume, VolumeCoord};

/// An open FAT file with its cluster chain resolved up front
#[derive(Debug, Clone)]
pub struct FatFile {
    coord: VolumeCoord,
    context: FatContext,
    first_cluster: u32,
    size: u32,
    chain: Vec<u32>,
}

impl FatFile {
    /// Materialise the chain for `entry`
    ///
    /// Empty files may have no valid first cluster; any other file must.
    pub(crate) fn open(
        volume: &mut Volume,
        context: FatContext,
        entry: &DirEntry,
        limits: &Limits,
    ) -> Result<Self> {
        let first_cluster = entry.first_cluster(&context);
        let chain = match chain::cache_cluster_chain(volume, &context, first_cluster, limits.fat_max_chain) {
            Ok(chain) => chain,
            Err(_) if entry.file_size == 0 => Vec::new(),
            Err(err) => return Err(err),
        };

        Ok(Self {
            coord: volume.coord(),
            context,
            first_cluster,
            size: entry.file_size,
            chain,
        })
    }

    /// File size in bytes
    pub fn size(&self) -> u64 {
        u64::from(self.size)
    }

    pub fn first_cluster(&self) -> u32 {
        self.first_cluster
    }

    pub fn chain(&self) -> &[u32] {
        &self.chain
    }

    pub fn context(&self) -> &FatContext {
        &self.context
    }

    pub fn coord(&self) -> VolumeCoord {
        self.coord
    }

    /// Read `buffer.len()` bytes starting at byte `offset` of the file
    pub fn try_read(&self, volume: &mut Volume, buffer: &mut [u8], offset: u64) -> Result<()> {
        if volume.coord() != self.coord {
            return Err(FatError::WrongVolume);
        }
        let end = offset
            .checked_add(buffer.len() as u64)
            .ok_or(FatError::ReadOutOfBounds)?;
        if end > self.size() {
            return Err(FatError::ReadOutOfBounds);
        }

        chain::read_cluster_chain(volume, &self.context, &self.chain, buffer, offset)
    }

    /// Read file data; any failure halts the boot
    pub fn read(&self, volume: &mut Volume, buffer: &mut [u8], offset: u64) {
        if let Err(err) = self.try_read(volume, buffer, offset) {
            panic!("fat: cluster chain read failed: {}", err);
        }
    }

    pub fn close(self) {}
}
