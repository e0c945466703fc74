// MBR partition table and extended boot record chains
//
// Sector fields are in device sectors.

use super::partition::{PartitionResult, PartitionStatus};
use morpheus_volume::Volume;

/// First partition record in the MBR and in every EBR
pub const PARTITION_TABLE_OFFSET: u64 = 0x1BE;

/// Second EBR record: link to the next EBR
pub const EBR_LINK_OFFSET: u64 = 0x1CE;

/// 32-bit disk signature
pub const DISK_ID_OFFSET: u64 = 0x1B8;

pub const ENTRY_SIZE: u64 = 16;

/// Primary entries in the MBR
pub const PRIMARY_ENTRIES: u32 = 4;

/// One 16-byte partition record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbrEntry {
    pub status: u8,
    pub partition_type: u8,
    pub first_sector: u32,
    pub sector_count: u32,
}

impl MbrEntry {
    pub fn parse(data: &[u8; ENTRY_SIZE as usize]) -> Self {
        Self {
            status: data[0],
            partition_type: data[4],
            first_sector: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            sector_count: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
        }
    }

    /// CHS (0x05) or LBA (0x0F) extended partition
    pub fn is_extended(&self) -> bool {
        matches!(self.partition_type, 0x05 | 0x0F)
    }

    pub fn is_unused(&self) -> bool {
        self.partition_type == 0 || self.sector_count == 0
    }
}

fn read_entry(volume: &mut Volume, offset: u64) -> Option<MbrEntry> {
    volume
        .read_array::<{ ENTRY_SIZE as usize }>(offset)
        .ok()
        .map(|raw| MbrEntry::parse(&raw))
}

/// Does sector 0 look like a partition table rather than a filesystem?
///
/// Rejects bad status bytes and the boot sector signatures of NTFS, FAT and
/// the ext2 superblock magic.
pub fn is_valid_mbr(volume: &mut Volume) -> bool {
    let check = |volume: &mut Volume| -> morpheus_volume::Result<bool> {
        for i in 0..u64::from(PRIMARY_ENTRIES) {
            let status = volume.read_u8(PARTITION_TABLE_OFFSET + i * ENTRY_SIZE)?;
            if status != 0x00 && status != 0x80 {
                return Ok(false);
            }
        }

        if &volume.read_array::<4>(3)? == b"NTFS" {
            return Ok(false);
        }
        if &volume.read_array::<3>(54)? == b"FAT" || &volume.read_array::<3>(82)? == b"FAT" {
            return Ok(false);
        }
        if &volume.read_array::<5>(3)? == b"FAT32" {
            return Ok(false);
        }
        if volume.read_le16(1080)? == 0xEF53 {
            return Ok(false);
        }
        Ok(true)
    };

    check(volume).unwrap_or(false)
}

/// 32-bit disk signature of a valid MBR
pub fn mbr_disk_id(volume: &mut Volume) -> Option<u32> {
    if !is_valid_mbr(volume) {
        return None;
    }
    volume.read_le32(DISK_ID_OFFSET).ok()
}

/// Volume for MBR partition `index`
///
/// Indices 0-3 are the primary entries; 4 and up walk the logical
/// partitions of the first extended partition.
pub fn mbr_get_part(volume: &mut Volume, index: u32, max_logical: u32) -> PartitionResult {
    if !is_valid_mbr(volume) {
        return Err(PartitionStatus::InvalidTable);
    }

    if index >= PRIMARY_ENTRIES {
        let extended = (0..PRIMARY_ENTRIES).find_map(|i| {
            let offset = PARTITION_TABLE_OFFSET + u64::from(i) * ENTRY_SIZE;
            read_entry(volume, offset)
                .filter(|entry| entry.is_extended() && entry.sector_count != 0)
                .map(|entry| (i, entry))
        });

        return match extended {
            Some((number, entry)) => {
                logical_part(volume, number + 1, &entry, index - PRIMARY_ENTRIES, max_logical)
            }
            None => Err(PartitionStatus::EndOfTable),
        };
    }

    let offset = PARTITION_TABLE_OFFSET + u64::from(index) * ENTRY_SIZE;
    let entry = read_entry(volume, offset).ok_or(PartitionStatus::EndOfTable)?;
    if entry.is_unused() {
        return Err(PartitionStatus::NoPartition);
    }

    volume
        .sub_volume(
            index + 1,
            u64::from(entry.first_sector),
            u64::from(entry.sector_count),
        )
        .map_err(|_| PartitionStatus::NoPartition)
}

/// Follow the EBR chain to logical partition `logical` (0-based)
fn logical_part(
    disk: &mut Volume,
    extended_number: u32,
    extended: &MbrEntry,
    logical: u32,
    max_logical: u32,
) -> PartitionResult {
    if logical >= max_logical {
        return Err(PartitionStatus::EndOfTable);
    }

    let ext_first = u64::from(extended.first_sector);
    let ext_count = u64::from(extended.sector_count);
    let mut container = disk
        .sub_volume(extended_number, ext_first, ext_count)
        .map_err(|_| PartitionStatus::EndOfTable)?;
    let sector_size = u64::from(container.sector_size());

    let ebr_offset = |ebr: u64, record: u64| {
        ebr.checked_mul(sector_size)
            .and_then(|base| base.checked_add(record))
            .ok_or(PartitionStatus::EndOfTable)
    };

    let mut ebr: u64 = 0;
    for hop in 0..logical {
        let link = read_entry(&mut container, ebr_offset(ebr, EBR_LINK_OFFSET)?)
            .ok_or(PartitionStatus::EndOfTable)?;
        if !link.is_extended() {
            return Err(PartitionStatus::EndOfTable);
        }

        // Links must move strictly forward inside the container
        let next = u64::from(link.first_sector);
        if next == 0 || (hop > 0 && next <= ebr) || next >= ext_count {
            return Err(PartitionStatus::EndOfTable);
        }
        ebr = next;
    }

    let entry = read_entry(&mut container, ebr_offset(ebr, PARTITION_TABLE_OFFSET)?)
        .ok_or(PartitionStatus::EndOfTable)?;
    if entry.is_unused() {
        return Err(PartitionStatus::NoPartition);
    }

    let first = ext_first
        .checked_add(ebr)
        .and_then(|sector| sector.checked_add(u64::from(entry.first_sector)))
        .ok_or(PartitionStatus::NoPartition)?;

    disk.sub_volume(
        PRIMARY_ENTRIES + logical + 1,
        first,
        u64::from(entry.sector_count),
    )
    .map_err(|_| PartitionStatus::NoPartition)
}
