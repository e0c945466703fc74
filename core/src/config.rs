//! Limits shared by partition discovery and the filesystem drivers
//!
//! Every cap here bounds an allocation or a loop driven by on-disk data, so
//! corrupt or hostile media cannot exhaust the boot allocator.

use iso9660::Iso9660Options;
use morpheus_volume::DEFAULT_TRANSFER_SECTORS;

/// Largest FAT directory loaded into memory (256 MiB)
pub const DEFAULT_FAT_MAX_DIR_SIZE: u64 = 256 * 1024 * 1024;

/// Longest cluster chain materialised for one file (a 64 MiB chain buffer)
pub const DEFAULT_FAT_MAX_CHAIN: u32 = 64 * 1024 * 1024 / 4;

/// Logical partitions followed through an EBR chain
pub const DEFAULT_MAX_LOGICAL_PARTITIONS: u32 = 256;

/// Partition indices tried per device during discovery
pub const DEFAULT_MAX_PARTITIONS: u32 = 1024;

/// Storage stack limits
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Largest FAT directory (root included) in bytes
    pub fat_max_dir_size: u64,
    /// Largest FAT cluster chain in entries
    pub fat_max_chain: u32,
    /// Logical partition cap inside an extended partition
    pub max_logical_partitions: u32,
    /// Partition indices enumerated per device
    pub max_partitions: u32,
    /// Initial sectors per cache block for new volumes
    pub transfer_sectors: u64,
    /// Match FAT long names case-sensitively
    pub case_sensitive: bool,
    /// ISO9660 driver limits
    pub iso: Iso9660Options,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            fat_max_dir_size: DEFAULT_FAT_MAX_DIR_SIZE,
            fat_max_chain: DEFAULT_FAT_MAX_CHAIN,
            max_logical_partitions: DEFAULT_MAX_LOGICAL_PARTITIONS,
            max_partitions: DEFAULT_MAX_PARTITIONS,
            transfer_sectors: DEFAULT_TRANSFER_SECTORS,
            case_sensitive: true,
            iso: Iso9660Options::default(),
        }
    }
}

impl Limits {
    /// Set the FAT directory size cap
    pub fn fat_max_dir_size(mut self, bytes: u64) -> Self {
        self.fat_max_dir_size = bytes;
        self
    }

    /// Set the FAT chain length cap
    pub fn fat_max_chain(mut self, entries: u32) -> Self {
        self.fat_max_chain = entries;
        self
    }

    /// Set the logical partition cap
    pub fn max_logical_partitions(mut self, count: u32) -> Self {
        self.max_logical_partitions = count;
        self
    }

    /// Set the partition enumeration cap
    pub fn max_partitions(mut self, count: u32) -> Self {
        self.max_partitions = count;
        self
    }

    /// Set the initial transfer size hint
    pub fn transfer_sectors(mut self, sectors: u64) -> Self {
        self.transfer_sectors = sectors;
        self
    }

    /// Case sensitivity for long names, on both FAT and ISO9660
    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = enabled;
        self.iso.case_sensitive = enabled;
        self
    }

    /// Replace the ISO9660 options
    pub fn iso(mut self, options: Iso9660Options) -> Self {
        self.iso = options;
        self
    }
}
