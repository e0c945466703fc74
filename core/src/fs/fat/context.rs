// FAT filesystem context and FAT table access

use super::directory::{self, DirLocation};
use super::error::{FatError, Result};
use crate::config::Limits;
use alloc::string::String;
use morpheus_volume::Volume;

pub const BOOT_SECTOR_SIZE: usize = 512;

const VALID_SECTORS_PER_CLUSTER: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];
const VALID_BYTES_PER_SECTOR: [u16; 4] = [512, 1024, 2048, 4096];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatType {
    Fat12,
    Fat16,
    Fat32,
}

impl FatType {
    /// Classify by data cluster count
    pub fn from_cluster_count(clusters: u64) -> Self {
        if clusters < 4085 {
            Self::Fat12
        } else if clusters < 65525 {
            Self::Fat16
        } else {
            Self::Fat32
        }
    }

    /// Highest cluster number that can hold data
    pub fn cluster_limit(self) -> u32 {
        match self {
            Self::Fat12 => 0xFEF,
            Self::Fat16 => 0xFFEF,
            Self::Fat32 => 0x0FFF_FFEF,
        }
    }
}

/// Geometry of one FAT volume, derived from its boot sector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatContext {
    pub fat_type: FatType,
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub hidden_sectors: u32,
    pub sectors_per_fat: u32,
    pub fat_start_sector: u32,
    pub data_start_sector: u32,
    pub root_cluster: u32,
    pub root_entries: u16,
    pub root_start: u32,
    pub root_size: u32,
    pub label: Option<String>,
}

impl FatContext {
    /// Read the boot sector of `volume` and look up the volume label
    pub fn new(volume: &mut Volume, limits: &Limits) -> Result<Self> {
        let boot_sector = volume.read_array::<BOOT_SECTOR_SIZE>(0)?;
        let mut ctx = Self::from_boot_sector(&boot_sector)?;
        ctx.label = directory::load(volume, &ctx, ctx.root_directory(), limits)
            .ok()
            .and_then(|dir| directory::find_label(&dir));
        Ok(ctx)
    }

    /// Parse and validate the BPB; the label is left empty
    pub fn from_boot_sector(bpb: &[u8; BOOT_SECTOR_SIZE]) -> Result<Self> {
        let has_signature =
            &bpb[0x36..0x39] == b"FAT" || &bpb[0x52..0x55] == b"FAT" || &bpb[0x03..0x08] == b"FAT32";
        if !has_signature {
            return Err(FatError::NotFat);
        }

        let le16 = |at: usize| u16::from_le_bytes([bpb[at], bpb[at + 1]]);
        let le32 = |at: usize| u32::from_le_bytes([bpb[at], bpb[at + 1], bpb[at + 2], bpb[at + 3]]);

        let bytes_per_sector = le16(0x0B);
        let sectors_per_cluster = bpb[0x0D];
        let reserved_sectors = le16(0x0E);
        let num_fats = bpb[0x10];
        let root_entries = le16(0x11);
        let sectors_16 = le16(0x13);
        let sectors_per_fat_16 = le16(0x16);
        let hidden_sectors = le32(0x1C);
        let sectors_32 = le32(0x20);
        let sectors_per_fat_32 = le32(0x24);
        let root_cluster = le32(0x2C);

        if !VALID_SECTORS_PER_CLUSTER.contains(&sectors_per_cluster)
            || !VALID_BYTES_PER_SECTOR.contains(&bytes_per_sector)
            || num_fats == 0
            || num_fats > 4
        {
            return Err(FatError::InvalidBootSector);
        }

        let bps = u64::from(bytes_per_sector);
        let root_dir_sectors = (u64::from(root_entries) * 32 + bps - 1) / bps;
        let total_sectors = if sectors_16 != 0 {
            u64::from(sectors_16)
        } else {
            u64::from(sectors_32)
        };
        let any_sectors_per_fat = if sectors_per_fat_16 != 0 {
            u64::from(sectors_per_fat_16)
        } else {
            u64::from(sectors_per_fat_32)
        };
        let metadata_sectors =
            u64::from(reserved_sectors) + u64::from(num_fats) * any_sectors_per_fat + root_dir_sectors;
        if metadata_sectors >= total_sectors {
            return Err(FatError::InvalidBootSector);
        }

        let clusters = (total_sectors - metadata_sectors) / u64::from(sectors_per_cluster);
        let fat_type = FatType::from_cluster_count(clusters);

        let sectors_per_fat = match fat_type {
            FatType::Fat32 => sectors_per_fat_32,
            _ => u32::from(sectors_per_fat_16),
        };
        if sectors_per_fat == 0 {
            return Err(FatError::InvalidBootSector);
        }

        let root_start = u64::from(reserved_sectors) + u64::from(num_fats) * u64::from(sectors_per_fat);
        let root_start = u32::try_from(root_start).map_err(|_| FatError::InvalidBootSector)?;
        let root_size = root_dir_sectors as u32;
        let data_start_sector = match fat_type {
            FatType::Fat32 => root_start,
            _ => root_start
                .checked_add(root_size)
                .ok_or(FatError::InvalidBootSector)?,
        };

        Ok(Self {
            fat_type,
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            num_fats,
            hidden_sectors,
            sectors_per_fat,
            fat_start_sector: u32::from(reserved_sectors),
            data_start_sector,
            root_cluster,
            root_entries,
            root_start,
            root_size,
            label: None,
        })
    }

    /// Bytes per cluster
    pub fn cluster_size(&self) -> u64 {
        u64::from(self.sectors_per_cluster) * u64::from(self.bytes_per_sector)
    }

    pub fn cluster_to_sector(&self, cluster: u32) -> Option<u64> {
        let index = cluster.checked_sub(2)?;
        u64::from(index)
            .checked_mul(u64::from(self.sectors_per_cluster))?
            .checked_add(u64::from(self.data_start_sector))
    }

    /// Byte offset of `cluster` within the volume
    pub fn cluster_to_offset(&self, cluster: u32) -> Option<u64> {
        self.cluster_to_sector(cluster)?
            .checked_mul(u64::from(self.bytes_per_sector))
    }

    /// Where the root directory lives
    pub fn root_directory(&self) -> DirLocation {
        match self.fat_type {
            FatType::Fat32 => DirLocation::Cluster(self.root_cluster),
            _ => DirLocation::FixedRoot,
        }
    }

    /// Is `cluster` a data cluster for this FAT type?
    pub fn is_data_cluster(&self, cluster: u32) -> bool {
        (2..=self.fat_type.cluster_limit()).contains(&cluster)
    }

    /// Next cluster after `cluster` according to the first FAT
    pub fn read_fat_entry(&self, volume: &mut Volume, cluster: u32) -> Result<u32> {
        let bps = u64::from(self.bytes_per_sector);
        let fat_base = u64::from(self.fat_start_sector) * bps;
        let fat_size = u64::from(self.sectors_per_fat) * bps;
        let cluster = u64::from(cluster);

        let (offset, width) = match self.fat_type {
            FatType::Fat12 => (cluster + cluster / 2, 2),
            FatType::Fat16 => (cluster * 2, 2),
            FatType::Fat32 => (cluster * 4, 4),
        };
        if offset + width > fat_size {
            return Err(FatError::InvalidCluster);
        }

        let entry = match self.fat_type {
            FatType::Fat12 => {
                let packed = volume.read_le16(fat_base + offset)?;
                if cluster % 2 == 0 {
                    u32::from(packed & 0x0FFF)
                } else {
                    u32::from(packed >> 4)
                }
            }
            FatType::Fat16 => u32::from(volume.read_le16(fat_base + offset)?),
            FatType::Fat32 => volume.read_le32(fat_base + offset)? & 0x0FFF_FFFF,
        };
        Ok(entry)
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}
