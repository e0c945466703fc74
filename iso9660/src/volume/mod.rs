//! Volume descriptor parsing
//!
//! ISO9660 volume descriptors start at sector 16 and describe the filesystem layout.
//! Only the Primary Volume Descriptor is used; others are skipped.

pub mod primary;

use crate::error::{Iso9660Error, Result};
use crate::options::Iso9660Options;
use crate::types::{
    VolumeDescriptorType, VolumeInfo, SECTOR_SIZE, STANDARD_IDENTIFIER, VOLUME_DESCRIPTOR_START,
};
use crate::utils::{sector::sector_to_byte, string};
use alloc::string::String;
use morpheus_volume::Volume;

/// Byte offset of the first descriptor's standard identifier
const SIGNATURE_OFFSET: u64 = VOLUME_DESCRIPTOR_START * SECTOR_SIZE as u64 + 1;

/// Check for the "CD001" identifier at the first volume descriptor
///
/// Read failures count as "not ISO9660".
pub fn is_iso9660(volume: &mut Volume) -> bool {
    matches!(
        volume.read_array::<5>(SIGNATURE_OFFSET),
        Ok(ref id) if id == STANDARD_IDENTIFIER
    )
}

/// Mount an ISO9660 volume
///
/// Scans descriptors from sector 16 until the Primary Volume Descriptor.
/// A terminator before it, a read failure, or running past
/// `options.max_descriptors` are errors. The root directory size is
/// validated against `options.max_dir_size`.
pub fn mount(volume: &mut Volume, options: &Iso9660Options) -> Result<VolumeInfo> {
    if !is_iso9660(volume) {
        return Err(Iso9660Error::InvalidSignature);
    }

    let mut buffer = [0u8; SECTOR_SIZE];
    let end = VOLUME_DESCRIPTOR_START + options.max_descriptors as u64;

    for sector in VOLUME_DESCRIPTOR_START..end {
        volume.read(&mut buffer, sector * SECTOR_SIZE as u64)?;

        match VolumeDescriptorType::from_code(buffer[0]) {
            Some(VolumeDescriptorType::Primary) => {
                let info = primary::parse(&buffer)?;
                if info.root_extent_len == 0 || info.root_extent_len > options.max_dir_size {
                    return Err(Iso9660Error::InvalidRootDirectory);
                }
                return Ok(info);
            }
            Some(VolumeDescriptorType::Terminator) => {
                return Err(Iso9660Error::NoPrimaryDescriptor);
            }
            _ => {}
        }
    }

    Err(Iso9660Error::DescriptorLimit)
}

/// Read the root directory extent described by `info`
pub fn load_root(volume: &mut Volume, info: &VolumeInfo) -> Result<alloc::vec::Vec<u8>> {
    let mut root = alloc::vec![0u8; info.root_extent_len as usize];
    volume.read(&mut root, sector_to_byte(info.root_extent_lba))?;
    Ok(root)
}

/// Volume label: the PVD volume identifier with trailing padding removed
///
/// `None` when the volume is not ISO9660, cannot be mounted, or the
/// identifier is blank.
pub fn get_label(volume: &mut Volume, options: &Iso9660Options) -> Option<String> {
    let info = mount(volume, options).ok()?;
    let label = string::trim_trailing_spaces(&info.volume_id);
    if label.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(label).into_owned())
}
