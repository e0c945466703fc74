//! Morpheus Core Library
//!
//! Partition discovery, the FAT driver, filesystem dispatch and the volume
//! index for pre-OS storage. Designed to be no_std compatible.
//!
//! # Usage
//!
//! ```ignore
//! use morpheus_core::{Filesystems, Limits, VolumeIndex};
//! use morpheus_volume::{shared, BlockIoDevice};
//!
//! let limits = Limits::default();
//! let mut fs = Filesystems::new(limits);
//! let mut index = VolumeIndex::new();
//! index.discover(shared(BlockIoDevice::new(block_io)), false, 0, &mut fs, &limits);
//!
//! let volume = index.find_by_label("BOOT").expect("boot volume");
//! let kernel = fs.open(volume, "/boot/vmlinuz").expect("kernel");
//! ```

#![no_std]
#![allow(clippy::new_without_default)]
#![allow(clippy::manual_div_ceil)]

extern crate alloc;

pub mod config;
pub mod disk;
pub mod fs;
pub mod index;
pub mod util;

pub use config::Limits;
pub use disk::{get_partition, IdentityProbe, NoProbe, PartitionResult, PartitionStatus};
pub use fs::{FileHandle, Filesystems};
pub use index::VolumeIndex;
