// Partition lookup: GPT first, MBR as fallback

use super::{gpt, mbr};
use crate::config::Limits;
use alloc::string::String;
use core::fmt;
use morpheus_volume::Volume;
use uguid::Guid;

/// Why a partition index produced no volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStatus {
    /// Slot exists but is unused; later indices may still hold partitions
    NoPartition,
    /// No partitions at this index or beyond
    EndOfTable,
    /// No recognizable partition table
    InvalidTable,
}

impl fmt::Display for PartitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPartition => write!(f, "No partition at this index"),
            Self::EndOfTable => write!(f, "End of partition table"),
            Self::InvalidTable => write!(f, "No valid partition table"),
        }
    }
}

/// A partition volume, or why there is none
pub type PartitionResult = Result<Volume, PartitionStatus>;

/// Filesystem identity queries made on every new partition
///
/// Implemented by the filesystem layer. `None` only means the value is not
/// known; it never fails the partition lookup.
pub trait IdentityProbe {
    /// Filesystem GUID
    fn get_guid(&mut self, volume: &mut Volume) -> Option<Guid>;

    /// Filesystem label
    fn get_label(&mut self, volume: &mut Volume) -> Option<String>;
}

/// Probe that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl IdentityProbe for NoProbe {
    fn get_guid(&mut self, _volume: &mut Volume) -> Option<Guid> {
        None
    }

    fn get_label(&mut self, _volume: &mut Volume) -> Option<String> {
        None
    }
}

/// Look up partition `index` (0-based) on `volume` with default limits
pub fn get_partition(
    volume: &mut Volume,
    index: u32,
    probe: &mut dyn IdentityProbe,
) -> PartitionResult {
    get_partition_with_limits(volume, index, probe, &Limits::default())
}

/// Look up partition `index` (0-based) on `volume`
///
/// GPT is tried first; MBR only when no valid GPT is present. The returned
/// volume carries the partition GUID (GPT) and whatever the probe found.
pub fn get_partition_with_limits(
    volume: &mut Volume,
    index: u32,
    probe: &mut dyn IdentityProbe,
    limits: &Limits,
) -> PartitionResult {
    let mut partition = match gpt::gpt_get_part(volume, index) {
        Err(PartitionStatus::InvalidTable) => {
            mbr::mbr_get_part(volume, index, limits.max_logical_partitions)?
        }
        result => result?,
    };

    let guid = probe.get_guid(&mut partition);
    let label = probe.get_label(&mut partition);
    let identity = partition.identity_mut();
    identity.guid = guid;
    identity.label = label;

    Ok(partition)
}
