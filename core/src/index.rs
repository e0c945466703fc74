//! Registry of discovered volumes
//!
//! The index owns every [`Volume`] found at boot: whole devices and their
//! partitions. Later stages look volumes up by GUID, label or coordinate.

use crate::config::Limits;
use crate::disk::{self, PartitionStatus};
use crate::fs::Filesystems;
use alloc::vec::Vec;
use log::{debug, info, warn};
use morpheus_volume::{SharedDevice, Volume, VolumeCoord};
use uguid::Guid;

/// Every volume discovered so far
#[derive(Default)]
pub struct VolumeIndex {
    volumes: Vec<Volume>,
}

impl VolumeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, volume: Volume) {
        self.volumes.push(volume);
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Volume> {
        self.volumes.iter()
    }

    /// First volume whose filesystem/disk GUID or partition GUID is `guid`
    pub fn find_by_guid(&mut self, guid: &Guid) -> Option<&mut Volume> {
        self.volumes
            .iter_mut()
            .find(|volume| volume.identity().matches_guid(guid))
    }

    /// First volume whose filesystem label is exactly `label`
    pub fn find_by_label(&mut self, label: &str) -> Option<&mut Volume> {
        self.volumes
            .iter_mut()
            .find(|volume| volume.identity().label.as_deref() == Some(label))
    }

    /// Volume at a device coordinate; partition 0 is the whole device
    pub fn find_by_coord(&mut self, optical: bool, drive: u32, partition: u32) -> Option<&mut Volume> {
        let coord = VolumeCoord {
            optical,
            drive,
            partition,
        };
        self.volumes.iter_mut().find(|volume| volume.coord() == coord)
    }

    /// Add a device and all of its partitions
    ///
    /// The whole-device volume gets the GPT disk GUID and its filesystem
    /// label (for unpartitioned media). Partition indices are tried until
    /// the table ends or `limits.max_partitions` is reached. Returns the
    /// number of volumes added.
    pub fn discover(
        &mut self,
        device: SharedDevice,
        optical: bool,
        drive: u32,
        fs: &mut Filesystems,
        limits: &Limits,
    ) -> usize {
        let mut disk = Volume::new(
            device,
            VolumeCoord::disk(optical, drive),
            limits.transfer_sectors,
        );
        let coord = disk.coord();

        let guid = disk::gpt_disk_guid(&mut disk);
        let label = fs.get_label(&mut disk);
        let identity = disk.identity_mut();
        identity.guid = guid;
        identity.label = label;

        let mut found = Vec::new();
        for index in 0..limits.max_partitions {
            match disk::get_partition_with_limits(&mut disk, index, fs, limits) {
                Ok(partition) => {
                    info!(
                        "{}: {} sectors at sector {}, label {:?}",
                        partition.coord(),
                        partition.sector_count().unwrap_or(0),
                        partition.first_sector(),
                        partition.identity().label
                    );
                    found.push(partition);
                }
                Err(PartitionStatus::NoPartition) => {
                    debug!("{}: no partition at index {}", coord, index);
                }
                Err(PartitionStatus::EndOfTable) => break,
                Err(PartitionStatus::InvalidTable) => {
                    if index > 0 || disk::has_gpt_signature(&mut disk) {
                        warn!("{}: invalid partition table", coord);
                    } else {
                        debug!("{}: not partitioned", coord);
                    }
                    break;
                }
            }
        }

        info!(
            "{}: {} sectors of {} bytes, {} partition(s), label {:?}",
            coord,
            disk.sector_count().unwrap_or(0),
            disk.sector_size(),
            found.len(),
            disk.identity().label
        );

        let added = found.len() + 1;
        self.volumes.push(disk);
        self.volumes.extend(found);
        added
    }
}
