//! Volume coordinates and identity

use alloc::string::String;
use core::fmt;
use uguid::Guid;

/// Where a volume lives: which device, and which partition on it
///
/// Partition 0 is the whole device. Partitions are numbered from 1, with MBR
/// logical partitions starting at 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VolumeCoord {
    /// Device is an optical drive
    pub optical: bool,
    /// Drive index among devices of the same kind
    pub drive: u32,
    /// Partition number (0 = whole device)
    pub partition: u32,
}

impl VolumeCoord {
    /// Coordinate of a whole device
    pub const fn disk(optical: bool, drive: u32) -> Self {
        Self {
            optical,
            drive,
            partition: 0,
        }
    }

    /// Same device, different partition
    pub const fn with_partition(self, partition: u32) -> Self {
        Self { partition, ..self }
    }

    /// Is this the whole device?
    pub fn is_whole_device(&self) -> bool {
        self.partition == 0
    }
}

impl fmt::Display for VolumeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.optical { "odd" } else { "hdd" };
        if self.partition == 0 {
            write!(f, "{}{}", kind, self.drive)
        } else {
            write!(f, "{}{}:{}", kind, self.drive, self.partition)
        }
    }
}

/// Identity discovered for a volume
///
/// Each field is optional; `None` means the corresponding value was not
/// found or is not meaningful for this volume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Filesystem GUID, or the disk GUID for a whole GPT device
    pub guid: Option<Guid>,
    /// GPT unique partition GUID
    pub part_guid: Option<Guid>,
    /// Filesystem label
    pub label: Option<String>,
}

impl Identity {
    /// Does either GUID match?
    pub fn matches_guid(&self, guid: &Guid) -> bool {
        self.guid.as_ref() == Some(guid) || self.part_guid.as_ref() == Some(guid)
    }
}
