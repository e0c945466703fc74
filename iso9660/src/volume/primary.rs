//! Primary Volume Descriptor parsing
//!
//! The Primary Volume Descriptor (PVD) is always present and describes
//! the basic ISO9660 filesystem structure. See ECMA-119 8.4.

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::types::{VolumeInfo, SECTOR_SIZE};
use crate::utils::{le16, le32};

/// Volume identifier (32 d-characters)
pub const VOLUME_ID_OFFSET: usize = 40;
/// Volume space size (both-endian 32-bit)
pub const SPACE_SIZE_OFFSET: usize = 80;
/// Logical block size (both-endian 16-bit)
pub const BLOCK_SIZE_OFFSET: usize = 128;
/// Root directory record (34 bytes)
pub const ROOT_RECORD_OFFSET: usize = 156;

/// Parse a Primary Volume Descriptor sector into [`VolumeInfo`]
pub fn parse(data: &[u8]) -> Result<VolumeInfo> {
    if data.len() < SECTOR_SIZE {
        return Err(Iso9660Error::InvalidSignature);
    }

    let root = DirectoryRecord::parse(&data[ROOT_RECORD_OFFSET..])
        .map_err(|_| Iso9660Error::InvalidRootDirectory)?;

    let mut volume_id = [0u8; 32];
    volume_id.copy_from_slice(&data[VOLUME_ID_OFFSET..VOLUME_ID_OFFSET + 32]);

    Ok(VolumeInfo {
        volume_id,
        root_extent_lba: root.extent_lba(),
        root_extent_len: root.data_length(),
        logical_block_size: le16(data, BLOCK_SIZE_OFFSET).unwrap_or(0),
        volume_space_size: le32(data, SPACE_SIZE_OFFSET).unwrap_or(0),
    })
}
