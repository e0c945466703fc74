//! Filesystem dispatch
//!
//! [`Filesystems`] holds the per-process filesystem state (the ISO9660
//! context registry and the limits) and routes each request to the driver
//! that recognizes the volume. Files opened through it are [`FileHandle`]s,
//! which expose the same open/read/close surface for both drivers.

pub mod fat;

use crate::config::Limits;
use crate::disk::IdentityProbe;
use alloc::string::String;
use core::fmt;
use iso9660::{ContextRegistry, IsoFile, Iso9660Error};
use log::debug;
use morpheus_volume::Volume;
use uguid::Guid;

pub use fat::{FatError, FatFile};

/// Which driver serves a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsKind {
    Iso9660,
    Fat,
}

/// Read failure from either driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    Fat(FatError),
    Iso9660(Iso9660Error),
}

impl From<FatError> for FsError {
    fn from(err: FatError) -> Self {
        Self::Fat(err)
    }
}

impl From<Iso9660Error> for FsError {
    fn from(err: Iso9660Error) -> Self {
        Self::Iso9660(err)
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fat(err) => write!(f, "fat: {}", err),
            Self::Iso9660(err) => write!(f, "iso9660: {}", err),
        }
    }
}

/// An open file on either filesystem
#[derive(Debug, Clone)]
pub enum FileHandle {
    Fat(FatFile),
    Iso9660(IsoFile),
}

impl FileHandle {
    /// File size in bytes
    pub fn size(&self) -> u64 {
        match self {
            Self::Fat(file) => file.size(),
            Self::Iso9660(file) => file.size(),
        }
    }

    pub fn kind(&self) -> FsKind {
        match self {
            Self::Fat(_) => FsKind::Fat,
            Self::Iso9660(_) => FsKind::Iso9660,
        }
    }

    /// Read `buffer.len()` bytes at `offset`, returning any failure
    pub fn try_read(&self, volume: &mut Volume, buffer: &mut [u8], offset: u64) -> Result<(), FsError> {
        match self {
            Self::Fat(file) => file.try_read(volume, buffer, offset)?,
            Self::Iso9660(file) => file.try_read(volume, buffer, offset)?,
        }
        Ok(())
    }

    /// Read `buffer.len()` bytes at `offset`
    ///
    /// # Panics
    ///
    /// On any failure: the range is past the end of the file, the handle
    /// belongs to another volume, or the medium turned out to be corrupt.
    pub fn read(&self, volume: &mut Volume, buffer: &mut [u8], offset: u64) {
        match self {
            Self::Fat(file) => file.read(volume, buffer, offset),
            Self::Iso9660(file) => file.read(volume, buffer, offset),
        }
    }

    /// Release the handle
    pub fn close(self) {
        match self {
            Self::Fat(file) => file.close(),
            Self::Iso9660(file) => file.close(),
        }
    }
}

/// Filesystem state shared by every open
pub struct Filesystems {
    iso: ContextRegistry,
    limits: Limits,
}

impl Default for Filesystems {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Filesystems {
    pub fn new(limits: Limits) -> Self {
        Self {
            iso: ContextRegistry::new(limits.iso),
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// ISO9660 contexts mounted so far
    pub fn iso_contexts(&self) -> &ContextRegistry {
        &self.iso
    }

    /// Which driver recognizes `volume`, if any
    pub fn detect(&self, volume: &mut Volume) -> Option<FsKind> {
        if iso9660::is_iso9660(volume) {
            Some(FsKind::Iso9660)
        } else if fat::is_fat(volume) {
            Some(FsKind::Fat)
        } else {
            None
        }
    }

    /// Open `path` on `volume`
    ///
    /// ISO9660 is tried first, then FAT. Every failure is reported as `None`
    /// and logged at debug level.
    pub fn open(&mut self, volume: &mut Volume, path: &str) -> Option<FileHandle> {
        let coord = volume.coord();
        match self.detect(volume) {
            Some(FsKind::Iso9660) => match self.iso.open(volume, path) {
                Ok(file) => Some(FileHandle::Iso9660(file)),
                Err(err) => {
                    debug!("{}: iso9660 open {:?} failed: {}", coord, path, err);
                    None
                }
            },
            Some(FsKind::Fat) => match fat::open(volume, path, &self.limits) {
                Ok(file) => Some(FileHandle::Fat(file)),
                Err(err) => {
                    debug!("{}: fat open {:?} failed: {}", coord, path, err);
                    None
                }
            },
            None => {
                debug!("{}: no filesystem recognized", coord);
                None
            }
        }
    }

    /// Filesystem label of `volume`
    pub fn get_label(&mut self, volume: &mut Volume) -> Option<String> {
        match self.detect(volume)? {
            FsKind::Iso9660 => iso9660::get_label(volume, &self.limits.iso),
            FsKind::Fat => fat::get_label(volume, &self.limits),
        }
    }

    /// Filesystem GUID of `volume`
    ///
    /// Neither FAT nor ISO9660 records one, so this is always `None`.
    pub fn get_guid(&mut self, _volume: &mut Volume) -> Option<Guid> {
        None
    }
}

impl IdentityProbe for Filesystems {
    fn get_guid(&mut self, volume: &mut Volume) -> Option<Guid> {
        Filesystems::get_guid(self, volume)
    }

    fn get_label(&mut self, volume: &mut Volume) -> Option<String> {
        Filesystems::get_label(self, volume)
    }
}
