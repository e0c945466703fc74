//! ISO9660 Filesystem Implementation
//!
//! A `no_std`, read-only ISO9660 driver for the boot stage.
//!
//! # Overview
//!
//! ISO9660 is the standard filesystem for CD-ROMs, DVDs and hybrid USB images.
//! This crate provides:
//! - Primary Volume Descriptor discovery (sector 16 onwards, bounded scan)
//! - Directory record walking with sector padding rules
//! - Rock Ridge alternate names (`NM` entries), falling back to ISO names
//! - Multi-extent files
//! - A per-volume context registry caching each volume's root directory
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Volume layer** - Finds and decodes the Primary Volume Descriptor
//! 2. **Directory layer** - Decodes directory records and resolves names
//! 3. **Context layer** - Caches root directories, resolves paths to files
//! 4. **File layer** - Reads file data across extents
//!
//! # Usage
//!
//! ```ignore
//! use iso9660::{ContextRegistry, Iso9660Options};
//!
//! let mut registry = ContextRegistry::new(Iso9660Options::default());
//!
//! // Resolve a path on a mounted volume
//! let file = registry.open(&mut volume, "/boot/vmlinuz")?;
//!
//! // Read the first 4 KiB
//! let mut header = [0u8; 4096];
//! file.read(&mut volume, &mut header, 0);
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod context;
pub mod directory;
pub mod error;
pub mod extensions;
pub mod file;
pub mod options;
pub mod types;
pub mod utils;
pub mod volume;

pub use context::{ContextRegistry, Iso9660Context};
pub use error::{Iso9660Error, Result};
pub use file::IsoFile;
pub use options::Iso9660Options;
pub use types::{FileFlags, VolumeInfo};

// High-level API exports
pub use volume::{get_label, is_iso9660, mount};
