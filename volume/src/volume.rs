//! Volumes and byte-range reads

use crate::cache::BlockCache;
use crate::device::{DiskStatus, SharedDevice};
use crate::error::{Result, VolumeError};
use crate::identity::{Identity, VolumeCoord};
use core::fmt;
use gpt_disk_types::Lba;

/// Default number of sectors per cache block
pub const DEFAULT_TRANSFER_SECTORS: u64 = 64;

/// Largest cache block, in bytes; longer transfer hints are clamped
pub const MAX_TRANSFER_BYTES: u64 = 16 * 1024 * 1024;

/// A whole device or one partition of it
///
/// Geometry is fixed at construction. All offsets passed to [`Volume::read`]
/// are relative to the start of the volume.
pub struct Volume {
    device: SharedDevice,
    coord: VolumeCoord,
    backing: Option<VolumeCoord>,
    sector_size: u32,
    sector_count: Option<u64>,
    first_sector: u64,
    transfer_sectors: u64,
    cache: BlockCache,
    identity: Identity,
}

impl fmt::Debug for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Volume")
            .field("coord", &self.coord)
            .field("backing", &self.backing)
            .field("sector_size", &self.sector_size)
            .field("sector_count", &self.sector_count)
            .field("first_sector", &self.first_sector)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl Volume {
    /// Volume covering an entire device
    ///
    /// `transfer_sectors` is the preferred number of sectors per device read;
    /// it may shrink later if the device rejects large transfers. It is
    /// clamped so one block never exceeds [`MAX_TRANSFER_BYTES`].
    pub fn new(device: SharedDevice, coord: VolumeCoord, transfer_sectors: u64) -> Self {
        let (sector_size, sector_count) = {
            let mut dev = device.borrow_mut();
            (dev.sector_size(), dev.sector_count())
        };
        let max_sectors = (MAX_TRANSFER_BYTES / u64::from(sector_size.max(1))).max(1);

        Self {
            device,
            coord,
            backing: None,
            sector_size,
            sector_count,
            first_sector: 0,
            transfer_sectors: transfer_sectors.clamp(1, max_sectors),
            cache: BlockCache::new(),
            identity: Identity::default(),
        }
    }

    /// Volume for a region of this one
    ///
    /// `first_sector` is relative to the start of `self`. The new volume
    /// reads through the same device and records the physical disk as its
    /// backing device.
    pub fn sub_volume(&self, partition: u32, first_sector: u64, sector_count: u64) -> Result<Self> {
        let absolute = self
            .first_sector
            .checked_add(first_sector)
            .ok_or(VolumeError::Overflow)?;
        absolute
            .checked_add(sector_count)
            .ok_or(VolumeError::Overflow)?;

        Ok(Self {
            device: self.device.clone(),
            coord: self.coord.with_partition(partition),
            backing: Some(self.backing.unwrap_or(self.coord)),
            sector_size: self.sector_size,
            sector_count: Some(sector_count),
            first_sector: absolute,
            transfer_sectors: self.transfer_sectors,
            cache: BlockCache::new(),
            identity: Identity::default(),
        })
    }

    /// Device coordinate of this volume
    pub fn coord(&self) -> VolumeCoord {
        self.coord
    }

    /// Physical disk this partition lives on (`None` for a whole device)
    pub fn backing(&self) -> Option<VolumeCoord> {
        self.backing
    }

    /// Bytes per sector
    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }

    /// Sectors in this volume, if known
    pub fn sector_count(&self) -> Option<u64> {
        self.sector_count
    }

    /// First device sector of this volume
    pub fn first_sector(&self) -> u64 {
        self.first_sector
    }

    /// Current transfer size hint in sectors
    pub fn transfer_sectors(&self) -> u64 {
        self.transfer_sectors
    }

    /// Size of one cache block in bytes
    pub fn block_size(&self) -> u64 {
        self.transfer_sectors * u64::from(self.sector_size)
    }

    /// Volume size in bytes, if known
    pub fn size_bytes(&self) -> Option<u64> {
        self.sector_count
            .and_then(|count| count.checked_mul(u64::from(self.sector_size)))
    }

    /// Index of the block currently held in the cache
    pub fn cached_block(&self) -> Option<u64> {
        self.cache.cached_block()
    }

    /// Discovered identity
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Mutable identity, filled in by partition and filesystem probes
    pub fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    /// Read `buffer.len()` bytes starting at byte `offset`
    pub fn read(&mut self, buffer: &mut [u8], offset: u64) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }

        let count = buffer.len() as u64;
        if let Some(sectors) = self.sector_count {
            let size = sectors
                .checked_mul(u64::from(self.sector_size))
                .ok_or(VolumeError::Overflow)?;
            if offset >= size || count > size - offset {
                return Err(VolumeError::OutOfBounds);
            }
        }

        let mut progress = 0usize;
        while progress < buffer.len() {
            let position = offset
                .checked_add(progress as u64)
                .ok_or(VolumeError::Overflow)?;
            let block_size = self.block_size();
            let block = position / block_size;

            if !self.cache_block(block)? {
                // Transfer size shrank; block geometry changed
                continue;
            }

            let in_block = (position % block_size) as usize;
            let chunk = (buffer.len() - progress).min(block_size as usize - in_block);
            buffer[progress..progress + chunk]
                .copy_from_slice(&self.cache.data()[in_block..in_block + chunk]);
            progress += chunk;
        }

        Ok(())
    }

    /// Read a fixed-size array at `offset`
    pub fn read_array<const N: usize>(&mut self, offset: u64) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        self.read(&mut bytes, offset)?;
        Ok(bytes)
    }

    /// Read one byte
    pub fn read_u8(&mut self, offset: u64) -> Result<u8> {
        Ok(self.read_array::<1>(offset)?[0])
    }

    /// Read a little-endian u16
    pub fn read_le16(&mut self, offset: u64) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array(offset)?))
    }

    /// Read a little-endian u32
    pub fn read_le32(&mut self, offset: u64) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array(offset)?))
    }

    /// Make `block` the cached block
    ///
    /// Returns `Ok(false)` when the device only accepted a smaller transfer:
    /// the transfer size hint has been lowered and the caller must recompute
    /// its block index.
    fn cache_block(&mut self, block: u64) -> Result<bool> {
        if self.cache.holds(block) {
            return Ok(true);
        }

        let block_sector = block
            .checked_mul(self.transfer_sectors)
            .ok_or(VolumeError::Overflow)?;
        let start = self
            .first_sector
            .checked_add(block_sector)
            .ok_or(VolumeError::Overflow)?;

        // Never ask for sectors past the end of the volume
        let mut transfer = match self.sector_count {
            Some(count) if block_sector < count => self.transfer_sectors.min(count - block_sector),
            Some(_) => return Err(VolumeError::OutOfBounds),
            None => self.transfer_sectors,
        };
        let wanted = transfer;

        let sector_size = u64::from(self.sector_size);
        let buffer = self.cache.prepare((self.transfer_sectors * sector_size) as usize);
        let mut device = self.device.borrow_mut();
        loop {
            let len = (transfer * sector_size) as usize;
            match device.read_sectors(Lba(start), transfer, &mut buffer[..len]) {
                DiskStatus::Success => break,
                DiskStatus::NoMedia => return Err(VolumeError::NoMedia),
                DiskStatus::Failed => {}
            }

            transfer -= 1;
            if transfer == 0 {
                return Err(VolumeError::DeviceError);
            }
        }
        drop(device);

        if transfer == wanted {
            self.cache.commit(block);
            return Ok(true);
        }

        self.transfer_sectors = transfer;
        if block_sector % transfer == 0 {
            self.cache.commit(block_sector / transfer);
        }
        Ok(false)
    }
}
