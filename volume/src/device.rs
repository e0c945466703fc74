//! Raw sector devices
//!
//! The platform supplies the actual sector reads (BIOS int 13h, UEFI block
//! I/O, a RAM disk). Everything above this module only sees [`SectorDevice`].

use alloc::rc::Rc;
use core::cell::RefCell;
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

/// Outcome of a raw sector read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskStatus {
    /// All requested sectors were transferred
    Success,
    /// No medium in the drive; retrying is pointless
    NoMedia,
    /// Transient failure; a smaller transfer may still succeed
    Failed,
}

/// Platform sector read primitive
pub trait SectorDevice {
    /// Bytes per device sector
    fn sector_size(&self) -> u32;

    /// Total number of sectors, if the device can report it
    fn sector_count(&mut self) -> Option<u64>;

    /// Read `count` sectors starting at `lba` into the front of `dst`
    ///
    /// `dst` is at least `count * sector_size()` bytes long.
    fn read_sectors(&mut self, lba: Lba, count: u64, dst: &mut [u8]) -> DiskStatus;
}

/// Device shared between a disk volume and all of its partitions
pub type SharedDevice = Rc<RefCell<dyn SectorDevice>>;

/// Wrap a device so several volumes can read through it
pub fn shared<D: SectorDevice + 'static>(device: D) -> SharedDevice {
    Rc::new(RefCell::new(device))
}

/// Adapter exposing a `gpt_disk_io::BlockIo` as a [`SectorDevice`]
///
/// `BlockIo` has no notion of "no media", so every error is reported as a
/// transient [`DiskStatus::Failed`].
pub struct BlockIoDevice<B> {
    inner: B,
}

impl<B: BlockIo> BlockIoDevice<B> {
    /// Wrap a block device
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

impl<B: BlockIo> SectorDevice for BlockIoDevice<B> {
    fn sector_size(&self) -> u32 {
        self.inner.block_size().to_u32()
    }

    fn sector_count(&mut self) -> Option<u64> {
        self.inner.num_blocks().ok()
    }

    fn read_sectors(&mut self, lba: Lba, count: u64, dst: &mut [u8]) -> DiskStatus {
        let len = match count
            .checked_mul(u64::from(self.sector_size()))
            .and_then(|len| usize::try_from(len).ok())
        {
            Some(len) if len <= dst.len() => len,
            _ => return DiskStatus::Failed,
        };

        match self.inner.read_blocks(lba, &mut dst[..len]) {
            Ok(()) => DiskStatus::Success,
            Err(_) => DiskStatus::Failed,
        }
    }
}
