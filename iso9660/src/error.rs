//! Error types for ISO9660 operations

use core::fmt;
use morpheus_volume::VolumeError;

/// Result type for ISO9660 operations
pub type Result<T> = core::result::Result<T, Iso9660Error>;

/// Errors that can occur during ISO9660 operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iso9660Error {
    /// I/O error reading from the volume
    IoError(VolumeError),

    /// No "CD001" identifier at the first volume descriptor
    InvalidSignature,

    /// Descriptor set ended without a Primary Volume Descriptor
    NoPrimaryDescriptor,

    /// Descriptor scan exceeded its search limit
    DescriptorLimit,

    /// Root directory extent is empty or too large
    InvalidRootDirectory,

    /// Directory extent is empty or exceeds the configured cap
    DirectoryTooLarge,

    /// Corrupted directory record
    InvalidDirectoryRecord,

    /// File or directory not found
    NotFound,

    /// Path names a directory where a file was expected, or the root
    IsDirectory,

    /// Intermediate path component is not a directory
    NotADirectory,

    /// Path component exceeds the maximum name length
    PathTooLong,

    /// Extent arithmetic overflowed
    ExtentOutOfBounds,

    /// Read range lies beyond the end of the file
    ReadOutOfBounds,

    /// File handle used with a volume it was not opened on
    WrongVolume,
}

impl From<VolumeError> for Iso9660Error {
    fn from(err: VolumeError) -> Self {
        Self::IoError(err)
    }
}

impl fmt::Display for Iso9660Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(err) => write!(f, "I/O error reading volume: {}", err),
            Self::InvalidSignature => write!(f, "Invalid volume descriptor signature"),
            Self::NoPrimaryDescriptor => write!(f, "No primary volume descriptor"),
            Self::DescriptorLimit => write!(f, "Exceeded volume descriptor search limit"),
            Self::InvalidRootDirectory => write!(f, "Invalid root directory size"),
            Self::DirectoryTooLarge => write!(f, "Directory extent too large"),
            Self::InvalidDirectoryRecord => write!(f, "Corrupted directory record"),
            Self::NotFound => write!(f, "File or directory not found"),
            Self::IsDirectory => write!(f, "Path names a directory"),
            Self::NotADirectory => write!(f, "Path component is not a directory"),
            Self::PathTooLong => write!(f, "Path component exceeds maximum length"),
            Self::ExtentOutOfBounds => write!(f, "File extent out of bounds"),
            Self::ReadOutOfBounds => write!(f, "Read beyond end of file"),
            Self::WrongVolume => write!(f, "File handle belongs to another volume"),
        }
    }
}
