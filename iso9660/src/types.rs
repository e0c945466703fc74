//! Common types and constants for ISO9660

/// ISO9660 sector size (always 2048 bytes)
pub const SECTOR_SIZE: usize = 2048;

/// Volume descriptor set starts at sector 16
pub const VOLUME_DESCRIPTOR_START: u64 = 16;

/// Standard identifier of every volume descriptor
pub const STANDARD_IDENTIFIER: &[u8; 5] = b"CD001";

/// Longest path component accepted during lookup
pub const MAX_COMPONENT_LENGTH: usize = 254;

/// Volume descriptor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VolumeDescriptorType {
    /// Boot Record (El Torito)
    BootRecord = 0,
    /// Primary Volume Descriptor
    Primary = 1,
    /// Supplementary Volume Descriptor (Joliet)
    Supplementary = 2,
    /// Volume Partition Descriptor
    Partition = 3,
    /// Volume Descriptor Set Terminator
    Terminator = 255,
}

impl VolumeDescriptorType {
    /// Decode a type code; unknown codes yield `None`
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::BootRecord),
            1 => Some(Self::Primary),
            2 => Some(Self::Supplementary),
            3 => Some(Self::Partition),
            255 => Some(Self::Terminator),
            _ => None,
        }
    }
}

/// Parsed volume information
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    /// Volume identifier (32 chars)
    pub volume_id: [u8; 32],

    /// Root directory extent location (LBA)
    pub root_extent_lba: u32,

    /// Root directory extent length (bytes)
    pub root_extent_len: u32,

    /// Logical block size (usually 2048)
    pub logical_block_size: u16,

    /// Volume space size (total sectors)
    pub volume_space_size: u32,
}

/// File flags from directory record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFlags {
    /// Hidden file
    pub hidden: bool,

    /// Directory (not a file)
    pub directory: bool,

    /// Associated file
    pub associated: bool,

    /// Extended attribute record format
    pub extended_format: bool,

    /// Owner/group permissions in extended attributes
    pub extended_permissions: bool,

    /// Not final directory record for this file (multi-extent)
    pub not_final: bool,
}

impl FileFlags {
    /// Directory flag bit
    pub const DIRECTORY: u8 = 0x02;

    /// Multi-extent flag bit
    pub const MULTI_EXTENT: u8 = 0x80;

    /// Decode the flags byte of a directory record
    pub fn from_byte(flags: u8) -> Self {
        Self {
            hidden: flags & 0x01 != 0,
            directory: flags & Self::DIRECTORY != 0,
            associated: flags & 0x04 != 0,
            extended_format: flags & 0x08 != 0,
            extended_permissions: flags & 0x10 != 0,
            not_final: flags & Self::MULTI_EXTENT != 0,
        }
    }
}
