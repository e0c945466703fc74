// Partition table parsing

pub mod gpt;
pub mod mbr;
pub mod partition;

pub use gpt::{gpt_disk_guid, has_gpt_signature};
pub use mbr::{is_valid_mbr, mbr_disk_id};
pub use partition::{
    get_partition, get_partition_with_limits, IdentityProbe, NoProbe, PartitionResult,
    PartitionStatus,
};
