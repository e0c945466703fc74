//! Error types for volume reads

use core::fmt;

/// Result type for volume operations
pub type Result<T> = core::result::Result<T, VolumeError>;

/// Errors that can occur while reading from a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeError {
    /// Requested byte range lies outside the volume
    OutOfBounds,

    /// Offset or size arithmetic overflowed
    Overflow,

    /// No medium present in the device
    NoMedia,

    /// Device read failed even at a single-sector transfer size
    DeviceError,
}

impl fmt::Display for VolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "Read beyond end of volume"),
            Self::Overflow => write!(f, "Offset arithmetic overflow"),
            Self::NoMedia => write!(f, "No media in device"),
            Self::DeviceError => write!(f, "Device read failed"),
        }
    }
}
