// GPT (GUID Partition Table) parser
//
// Header and entries are decoded field by field from byte buffers; nothing
// read from disk is trusted until it has been range checked.

use super::partition::{PartitionResult, PartitionStatus};
use gpt_disk_types::{BlockSize, GptPartitionType, Lba};
use morpheus_volume::Volume;
use uguid::Guid;

pub const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";
pub const GPT_REVISION: u32 = 0x0001_0000;

/// Bytes of the header that are decoded
pub const HEADER_SIZE: usize = 92;

/// Smallest legal partition entry
pub const MIN_ENTRY_SIZE: u32 = 128;

/// Logical block sizes tried when looking for the header at LBA 1
const BLOCK_SIZE_GUESSES: [BlockSize; 2] = [BlockSize::BS_512, BlockSize::BS_4096];

/// Decoded GPT header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GptHeader {
    pub revision: u32,
    pub disk_guid: Guid,
    pub partition_entry_lba: Lba,
    pub num_partition_entries: u32,
    pub partition_entry_size: u32,
}

impl GptHeader {
    /// Decode a header, `None` if the signature is missing
    pub fn parse(data: &[u8; HEADER_SIZE]) -> Option<Self> {
        if &data[0..8] != GPT_SIGNATURE {
            return None;
        }

        Some(Self {
            revision: le32(data, 8),
            disk_guid: guid_at(data, 56),
            partition_entry_lba: Lba(le64(data, 72)),
            num_partition_entries: le32(data, 80),
            partition_entry_size: le32(data, 84),
        })
    }

    pub fn validate(&self) -> bool {
        self.revision == GPT_REVISION
    }
}

/// Decoded partition entry (the first 48 bytes of the record)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GptEntry {
    pub partition_type: GptPartitionType,
    pub unique_guid: Guid,
    pub starting_lba: Lba,
    pub ending_lba: Lba,
}

impl GptEntry {
    pub fn parse(data: &[u8; MIN_ENTRY_SIZE as usize]) -> Self {
        Self {
            partition_type: GptPartitionType(guid_at(data, 0)),
            unique_guid: guid_at(data, 16),
            starting_lba: Lba(le64(data, 32)),
            ending_lba: Lba(le64(data, 40)),
        }
    }

    pub fn is_used(&self) -> bool {
        self.unique_guid != Guid::ZERO
    }

    /// Partition extent in device sectors as `(first, count)`
    ///
    /// `None` if the LBAs are inverted, the size overflows, or the start is
    /// not on a device sector boundary.
    pub fn sector_range(&self, block_size: BlockSize, sector_size: u32) -> Option<(u64, u64)> {
        let (start, end) = (self.starting_lba.0, self.ending_lba.0);
        if end < start {
            return None;
        }

        let block = block_size.to_u64();
        let sector = u64::from(sector_size);
        let start_bytes = start.checked_mul(block)?;
        let size_bytes = (end - start).checked_add(1)?.checked_mul(block)?;
        start_bytes.checked_add(size_bytes)?;

        if sector == 0 || start_bytes % sector != 0 {
            return None;
        }
        Some((start_bytes / sector, size_bytes / sector))
    }
}

/// Find the header at LBA 1 for each block size guess
///
/// Returns the first header whose signature matches, valid or not, along
/// with the block size it was found at.
pub fn find_header(volume: &mut Volume) -> Option<(GptHeader, BlockSize)> {
    BLOCK_SIZE_GUESSES.iter().find_map(|&block_size| {
        let raw = volume.read_array::<HEADER_SIZE>(block_size.to_u64()).ok()?;
        GptHeader::parse(&raw).map(|header| (header, block_size))
    })
}

/// Is there a GPT signature on this volume?
pub fn has_gpt_signature(volume: &mut Volume) -> bool {
    find_header(volume).is_some()
}

/// Disk GUID from a valid GPT header
pub fn gpt_disk_guid(volume: &mut Volume) -> Option<Guid> {
    let (header, _) = find_header(volume)?;
    header.validate().then_some(header.disk_guid)
}

/// Volume for GPT entry `index`
pub fn gpt_get_part(volume: &mut Volume, index: u32) -> PartitionResult {
    let (header, block_size) = find_header(volume).ok_or(PartitionStatus::InvalidTable)?;
    if !header.validate() {
        return Err(PartitionStatus::InvalidTable);
    }
    if index >= header.num_partition_entries {
        return Err(PartitionStatus::EndOfTable);
    }
    if header.partition_entry_size < MIN_ENTRY_SIZE {
        return Err(PartitionStatus::InvalidTable);
    }

    let offset = header
        .partition_entry_lba
        .0
        .checked_mul(block_size.to_u64())
        .and_then(|base| {
            let within = u64::from(index).checked_mul(u64::from(header.partition_entry_size))?;
            base.checked_add(within)
        })
        .ok_or(PartitionStatus::InvalidTable)?;

    let raw = volume
        .read_array::<{ MIN_ENTRY_SIZE as usize }>(offset)
        .map_err(|_| PartitionStatus::EndOfTable)?;
    let entry = GptEntry::parse(&raw);
    if !entry.is_used() {
        return Err(PartitionStatus::NoPartition);
    }

    let (first, count) = entry
        .sector_range(block_size, volume.sector_size())
        .ok_or(PartitionStatus::NoPartition)?;
    let mut partition = volume
        .sub_volume(index + 1, first, count)
        .map_err(|_| PartitionStatus::NoPartition)?;
    partition.identity_mut().part_guid = Some(entry.unique_guid);

    Ok(partition)
}

fn le32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn le64(data: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[at..at + 8]);
    u64::from_le_bytes(bytes)
}

fn guid_at(data: &[u8], at: usize) -> Guid {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&data[at..at + 16]);
    Guid::from_bytes(bytes)
}
