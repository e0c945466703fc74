//! Directory Record structure
//!
//! Directory records describe files and subdirectories. Fields are decoded
//! at explicit byte offsets; both-endian fields use their little-endian half.
//!
//! ```text
//! 0   length             1   extended attribute length
//! 2   extent LBA (LE+BE)  10  data length (LE+BE)
//! 18  recording date (7)  25  file flags
//! 26  unit size           27  interleave gap
//! 28  volume sequence     32  file identifier length
//! 33  file identifier, pad byte when the length is even, system use area
//! ```

use crate::error::{Iso9660Error, Result};
use crate::extensions::rock_ridge;
use crate::types::FileFlags;
use crate::utils::{le32, string};

/// A record's resolved name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordName<'a> {
    /// Name from a Rock Ridge `NM` entry
    RockRidge(&'a [u8]),
    /// ISO name with its version suffix stripped
    Iso(&'a [u8]),
}

impl<'a> RecordName<'a> {
    /// Raw name bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Self::RockRidge(name) | Self::Iso(name) => name,
        }
    }

    /// Compare with a path component
    ///
    /// Rock Ridge names compare exactly when `case_sensitive` is set; every
    /// other comparison ignores ASCII case.
    pub fn matches(&self, component: &[u8], case_sensitive: bool) -> bool {
        match *self {
            Self::RockRidge(name) if case_sensitive => name == component,
            _ => self.as_bytes().eq_ignore_ascii_case(component),
        }
    }
}

/// Directory Record (variable length), borrowed from a directory buffer
#[derive(Debug, Clone, Copy)]
pub struct DirectoryRecord<'a> {
    bytes: &'a [u8],
}

impl<'a> DirectoryRecord<'a> {
    /// Fixed header length preceding the file identifier
    pub const HEADER_LEN: usize = 33;

    /// Parse the record starting at `data[0]`
    ///
    /// The record must be at least a header long and fit inside `data`.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let length = *data.first().ok_or(Iso9660Error::InvalidDirectoryRecord)? as usize;
        if length < Self::HEADER_LEN || length > data.len() {
            return Err(Iso9660Error::InvalidDirectoryRecord);
        }
        Ok(Self {
            bytes: &data[..length],
        })
    }

    /// Record length in bytes
    pub fn length(&self) -> usize {
        self.bytes.len()
    }

    /// Extent location
    pub fn extent_lba(&self) -> u32 {
        le32(self.bytes, 2).unwrap_or(0)
    }

    /// Data length in bytes
    pub fn data_length(&self) -> u32 {
        le32(self.bytes, 10).unwrap_or(0)
    }

    /// Parse file flags
    pub fn flags(&self) -> FileFlags {
        FileFlags::from_byte(self.bytes[25])
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.flags().directory
    }

    /// Does another record continue this file?
    pub fn is_multi_extent(&self) -> bool {
        self.flags().not_final
    }

    /// Declared file identifier length
    pub fn identifier_len(&self) -> usize {
        self.bytes[32] as usize
    }

    /// File identifier bytes, clamped to the record
    pub fn file_identifier(&self) -> &'a [u8] {
        let end = (Self::HEADER_LEN + self.identifier_len()).min(self.bytes.len());
        &self.bytes[Self::HEADER_LEN..end]
    }

    /// System Use area; empty when the identifier overruns the record
    pub fn system_use(&self) -> &'a [u8] {
        let id_len = self.identifier_len();
        let mut start = Self::HEADER_LEN + id_len;
        if start > self.bytes.len() {
            return &[];
        }
        if id_len % 2 == 0 {
            start += 1;
        }
        self.bytes.get(start..).unwrap_or(&[])
    }

    /// Name used for lookups: Rock Ridge when present, else the ISO name
    pub fn name(&self) -> RecordName<'a> {
        match rock_ridge::alternate_name(self.system_use()) {
            Some(name) => RecordName::RockRidge(name),
            None => RecordName::Iso(string::strip_version(self.file_identifier())),
        }
    }
}
