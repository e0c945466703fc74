//! Sector-addressable volumes for pre-OS storage drivers
//!
//! A [`Volume`] is a window onto a sector device: either the whole device or
//! one partition of it. Every volume owns a single-block read cache and
//! exposes plain byte-range reads, which is all the partition resolver and
//! the filesystem drivers need.
//!
//! # Architecture
//!
//! 1. **Device layer** - [`SectorDevice`], the platform's raw sector read
//!    primitive, plus [`BlockIoDevice`] for anything implementing
//!    `gpt_disk_io::BlockIo`
//! 2. **Cache layer** - one cached block per volume, refilled on demand with a
//!    bounded, degrading retry loop
//! 3. **Volume layer** - bounds checking, partition offsets and identity
//!
//! # Usage
//!
//! ```ignore
//! use morpheus_volume::{shared, BlockIoDevice, Volume, VolumeCoord};
//!
//! let device = shared(BlockIoDevice::new(block_io));
//! let mut disk = Volume::new(device, VolumeCoord::disk(false, 0), 64);
//!
//! let mut mbr = [0u8; 512];
//! disk.read(&mut mbr, 0)?;
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod cache;
pub mod device;
pub mod error;
pub mod identity;
pub mod volume;

pub use device::{shared, BlockIoDevice, DiskStatus, SectorDevice, SharedDevice};
pub use error::{Result, VolumeError};
pub use identity::{Identity, VolumeCoord};
pub use volume::{Volume, DEFAULT_TRANSFER_SECTORS, MAX_TRANSFER_BYTES};
