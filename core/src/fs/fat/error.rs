// Error type for the FAT driver

use core::fmt;
use morpheus_volume::VolumeError;

pub type Result<T> = core::result::Result<T, FatError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatError {
    IoError(VolumeError),
    /// No FAT signature in the boot sector
    NotFat,
    /// Boot sector geometry out of range or inconsistent
    InvalidBootSector,
    /// Cluster number outside the valid range, or FAT entry out of bounds
    InvalidCluster,
    /// Cluster chain did not terminate within the cap
    ChainTooLong,
    DirectoryTooLarge,
    /// Long name matched but no short entry follows it
    CorruptLongName,
    NotFound,
    NotADirectory,
    /// Path names a directory where a file was expected
    IsADirectory,
    PathTooLong,
    ReadOutOfBounds,
    /// Handle used with a volume it was not opened on
    WrongVolume,
}

impl From<VolumeError> for FatError {
    fn from(err: VolumeError) -> Self {
        Self::IoError(err)
    }
}

impl fmt::Display for FatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(err) => write!(f, "I/O error: {}", err),
            Self::NotFat => write!(f, "Not a FAT filesystem"),
            Self::InvalidBootSector => write!(f, "Invalid boot sector"),
            Self::InvalidCluster => write!(f, "Invalid cluster number"),
            Self::ChainTooLong => write!(f, "Cluster chain too long or circular"),
            Self::DirectoryTooLarge => write!(f, "Directory too large"),
            Self::CorruptLongName => write!(f, "Long name without short entry"),
            Self::NotFound => write!(f, "File not found"),
            Self::NotADirectory => write!(f, "Not a directory"),
            Self::IsADirectory => write!(f, "Is a directory"),
            Self::PathTooLong => write!(f, "Path component too long"),
            Self::ReadOutOfBounds => write!(f, "Read beyond end of file"),
            Self::WrongVolume => write!(f, "Handle belongs to another volume"),
        }
    }
}
